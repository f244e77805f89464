//! Recursive-descent parsing of statement text.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expression  := disjunction [ ("↔" | "→") disjunction ]
//! disjunction := conjunction { "∨" conjunction }
//! conjunction := unary { "∧" unary }
//! unary       := "¬" unary | "(" expression ")" | quantifier | "⊤" | "⊥" | predicate
//! quantifier  := ("∀" | "∃") symbol { "," symbol } unary
//! predicate   := Upper { alnum } [ "(" term { "," term } ")" ]
//! term        := lower { alnum } [ "(" term { "," term } ")" ]
//! ```
//!
//! Quantifiers and predicate arguments belong to the first-order dialect
//! only. A conditional or biconditional cannot be chained without
//! parentheses. Every operator has several spellings; see the constants
//! below.

use crate::error::{Found, ParseError};
use crate::formula::Formula;
use crate::statement::Statement;
use serde::{Deserialize, Serialize};

/// Which grammar statement text is read with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
    Propositional,
    #[default]
    FirstOrder,
}

pub const BICONDITIONAL: &[&str] = &["↔", "<->", "%", "iff", "equiv"];
pub const CONDITIONAL: &[&str] = &["→", "->", "$", "implies", "only if"];
pub const CONJUNCTION: &[&str] = &["∧", "&", "and"];
pub const DISJUNCTION: &[&str] = &["∨", "|", "or"];
pub const NEGATION: &[&str] = &["¬", "!", "~", "not"];
pub const UNIVERSAL: &[&str] = &["∀", "forall"];
pub const EXISTENTIAL: &[&str] = &["∃", "exists"];

const TRUTH_CONSTANTS: &[&str] = &["⊤", "⊥"];

/// Deepest nesting of unary operators, parentheses and function terms
/// accepted before parsing gives up
pub const MAX_DEPTH: usize = 128;

/// Parses first-order statement text
pub fn parse(text: &str) -> Result<Statement, ParseError> {
    parse_with(Dialect::FirstOrder, text)
}

/// Parses statement text with the given grammar
///
/// Nested conjunctions and disjunctions come back flattened, so `A ∧ (B ∧ C)`
/// and `A ∧ B ∧ C` produce the same three-operand `And`.
pub fn parse_with(dialect: Dialect, text: &str) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(dialect, text);
    let statement = parser.expression()?;
    parser.assert_end()?;
    Ok(statement.flattened())
}

type Rule<T> = (&'static str, fn(&mut Parser) -> Result<T, ParseError>);

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    dialect: Dialect,
}

////////////////////////////////////////////////////////////////////////////////
// Cursor primitives

impl Parser {
    fn new(dialect: Dialect, text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
            dialect,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn found_at(&self, pos: usize) -> Found {
        self.chars.get(pos).copied().map_or(Found::End, Found::Char)
    }

    fn found(&self) -> Found {
        self.found_at(self.pos)
    }

    fn eat_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn at(&self, keyword: &str) -> bool {
        keyword
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    /// Consumes the first of `keywords` found at the cursor, along with the
    /// whitespace around it
    fn keyword(&mut self, keywords: &[&'static str]) -> Result<&'static str, ParseError> {
        self.eat_whitespace();
        for &keyword in keywords {
            if self.at(keyword) {
                self.pos += keyword.chars().count();
                self.eat_whitespace();
                return Ok(keyword);
            }
        }
        Err(ParseError::new(
            self.pos,
            format!("Expected {} but got {}", keywords.join(","), self.found()),
        ))
    }

    fn maybe_keyword(&mut self, keywords: &[&'static str]) -> Option<&'static str> {
        let start = self.pos;
        match self.keyword(keywords) {
            Ok(keyword) => Some(keyword),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    /// Tries each rule from the same position and returns the first success
    ///
    /// When every rule fails, the error that got furthest wins. If several
    /// rules got equally far, the error names all of them.
    fn one_of<T>(&mut self, rules: &[Rule<T>]) -> Result<T, ParseError> {
        self.eat_whitespace();
        let start = self.pos;
        let mut furthest: Option<ParseError> = None;
        let mut tied = vec![];

        for &(name, rule) in rules {
            match rule(self) {
                Ok(value) => {
                    self.eat_whitespace();
                    return Ok(value);
                }
                Err(err) => {
                    self.pos = start;
                    match &furthest {
                        Some(best) if err.position < best.position => {}
                        Some(best) if err.position == best.position => tied.push(name),
                        _ => {
                            tied = vec![name];
                            furthest = Some(err);
                        }
                    }
                }
            }
        }

        match furthest {
            Some(err) if tied.len() == 1 => Err(err),
            Some(err) => {
                let found = self.found_at(err.position);
                Err(ParseError::tied(err.position, tied, found))
            }
            None => Err(ParseError::new(start, "Nothing to parse")),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(
                self.pos,
                format!("Nesting deeper than {} levels", MAX_DEPTH),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn assert_end(&mut self) -> Result<(), ParseError> {
        self.eat_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(ParseError::new(
                self.pos,
                format!("Expected end of string but got {}", self.found()),
            )),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Statement rules

impl Parser {
    fn expression(&mut self) -> Result<Statement, ParseError> {
        let lhs = self.disjunction()?;
        match self.continuation()? {
            None => Ok(lhs),
            Some((op, rhs)) if BICONDITIONAL.contains(&op) => {
                Ok(Statement::Biconditional(Box::new(lhs), Box::new(rhs)))
            }
            Some((_, rhs)) => Ok(Statement::Conditional(Box::new(lhs), Box::new(rhs))),
        }
    }

    /// The operator and right-hand side of a conditional or biconditional
    fn continuation(&mut self) -> Result<Option<(&'static str, Statement)>, ParseError> {
        let op = match self
            .maybe_keyword(BICONDITIONAL)
            .or_else(|| self.maybe_keyword(CONDITIONAL))
        {
            Some(op) => op,
            None => return Ok(None),
        };
        let rhs = self.disjunction()?;

        let chained = self.pos;
        if self.maybe_keyword(BICONDITIONAL).is_some() || self.maybe_keyword(CONDITIONAL).is_some() {
            return Err(ParseError::new(
                chained,
                format!(
                    "Expected end of conditional but got {}; chained conditionals need parentheses",
                    self.found_at(chained)
                ),
            ));
        }
        Ok(Some((op, rhs)))
    }

    fn disjunction(&mut self) -> Result<Statement, ParseError> {
        self.sequence(DISJUNCTION, Self::conjunction, Statement::Or)
    }

    fn conjunction(&mut self) -> Result<Statement, ParseError> {
        self.sequence(CONJUNCTION, Self::unary, Statement::And)
    }

    /// Parses `operand { op operand }`, building a single n-ary statement
    /// when more than one operand is present
    fn sequence(
        &mut self,
        op: &[&'static str],
        operand: fn(&mut Parser) -> Result<Statement, ParseError>,
        build: fn(Vec<Statement>) -> Statement,
    ) -> Result<Statement, ParseError> {
        let first = operand(self)?;
        let mut operands = vec![];
        while self.maybe_keyword(op).is_some() {
            operands.push(operand(self)?);
        }
        if operands.is_empty() {
            Ok(first)
        } else {
            operands.insert(0, first);
            Ok(build(operands))
        }
    }

    fn unary(&mut self) -> Result<Statement, ParseError> {
        self.enter()?;
        let mut rules: Vec<Rule<Statement>> = vec![
            ("negation", Self::negation),
            ("parenthesized statement", Self::parenthesized),
        ];
        if self.dialect == Dialect::FirstOrder {
            rules.push(("quantifier", Self::quantifier));
        }
        rules.push(("truth constant", Self::truth_constant));
        rules.push(("predicate", Self::atom));

        let result = self.one_of(&rules);
        self.depth -= 1;
        result
    }

    fn negation(&mut self) -> Result<Statement, ParseError> {
        self.keyword(NEGATION)?;
        Ok(Statement::Not(Box::new(self.unary()?)))
    }

    fn parenthesized(&mut self) -> Result<Statement, ParseError> {
        self.keyword(&["("])?;
        let inner = self.expression()?;
        self.keyword(&[")"])?;
        Ok(inner)
    }

    fn quantifier(&mut self) -> Result<Statement, ParseError> {
        let keywords: Vec<&'static str> = UNIVERSAL.iter().chain(EXISTENTIAL).copied().collect();
        let quantifier = self.keyword(&keywords)?;

        let mut vars = vec![Formula::symbol(self.name(char::is_ascii_lowercase, "lowercase letter")?)];
        while self.maybe_keyword(&[","]).is_some() {
            vars.push(Formula::symbol(
                self.name(char::is_ascii_lowercase, "lowercase letter")?,
            ));
        }
        self.eat_whitespace();
        let body = Box::new(self.unary()?);

        if UNIVERSAL.contains(&quantifier) {
            Ok(Statement::Universal(vars, body))
        } else {
            Ok(Statement::Existential(vars, body))
        }
    }

    fn truth_constant(&mut self) -> Result<Statement, ParseError> {
        match self.keyword(TRUTH_CONSTANTS)? {
            "⊤" => Ok(Statement::Tautology),
            _ => Ok(Statement::Contradiction),
        }
    }

    fn atom(&mut self) -> Result<Statement, ParseError> {
        let name = self.name(char::is_ascii_uppercase, "uppercase letter")?;
        let args = match self.dialect {
            Dialect::FirstOrder if self.peek() == Some('(') => Some(self.arguments()?),
            _ => None,
        };
        Ok(Statement::Atomic(Formula::predicate(name, args)))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Term rules

impl Parser {
    /// Reads a name whose first char satisfies `first` and whose remaining
    /// chars are alphanumeric
    fn name(&mut self, first: fn(&char) -> bool, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(c) if first(&c) => {}
            _ => {
                return Err(ParseError::new(
                    self.pos,
                    format!("Expected {} but got {}", what, self.found()),
                ))
            }
        }
        let start = self.pos;
        self.pos += 1;
        while self.peek().map_or(false, |c| c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn arguments(&mut self) -> Result<Vec<Formula>, ParseError> {
        self.keyword(&["("])?;
        let mut args = vec![self.term()?];
        while self.maybe_keyword(&[","]).is_some() {
            args.push(self.term()?);
        }
        self.keyword(&[")"])?;
        Ok(args)
    }

    fn term(&mut self) -> Result<Formula, ParseError> {
        self.enter()?;
        let result = self.name(char::is_ascii_lowercase, "lowercase letter").and_then(|name| {
            if self.peek() == Some('(') {
                Ok(Formula::function(name, self.arguments()?))
            } else {
                self.eat_whitespace();
                Ok(Formula::symbol(name))
            }
        });
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Statement::*;

    fn atom(name: &str) -> Statement {
        Atomic(Formula::predicate(name, None))
    }

    fn not(s: Statement) -> Statement {
        Not(Box::new(s))
    }

    #[test]
    fn every_operator_spelling() {
        let (a, b) = (atom("A"), atom("B"));
        for op in BICONDITIONAL {
            let parsed = parse(&format!("A {} B", op)).unwrap();
            assert_eq!(parsed, Biconditional(Box::new(a.clone()), Box::new(b.clone())), "{}", op);
        }
        for op in CONDITIONAL {
            let parsed = parse(&format!("A {} B", op)).unwrap();
            assert_eq!(parsed, Conditional(Box::new(a.clone()), Box::new(b.clone())), "{}", op);
        }
        for op in CONJUNCTION {
            assert_eq!(parse(&format!("A {} B", op)).unwrap(), And(vec![a.clone(), b.clone()]));
        }
        for op in DISJUNCTION {
            assert_eq!(parse(&format!("A {} B", op)).unwrap(), Or(vec![a.clone(), b.clone()]));
        }
        for op in NEGATION {
            assert_eq!(parse(&format!("{} A", op)).unwrap(), not(a.clone()));
        }
    }

    #[test]
    fn precedence() {
        let (a, b, c) = (atom("A"), atom("B"), atom("C"));
        assert_eq!(
            parse("A ∨ B ∧ C").unwrap(),
            Or(vec![a.clone(), And(vec![b.clone(), c.clone()])])
        );
        assert_eq!(
            parse("A → B ∨ C").unwrap(),
            Conditional(Box::new(a.clone()), Box::new(Or(vec![b.clone(), c.clone()])))
        );
        assert_eq!(parse("¬A ∧ B").unwrap(), And(vec![not(a.clone()), b.clone()]));
        assert_eq!(parse("¬(A ∧ B)").unwrap(), not(And(vec![a, b])));
    }

    #[test]
    fn same_kind_operands_flatten() {
        let (a, b, c) = (atom("A"), atom("B"), atom("C"));
        let flat = And(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(parse("A ∧ B ∧ C").unwrap(), flat);
        assert_eq!(parse("A ∧ (B ∧ C)").unwrap(), flat);
        assert_eq!(parse("(A ∧ B) ∧ C").unwrap(), flat);
        assert_eq!(
            parse("A ∨ (B ∧ C)").unwrap(),
            Or(vec![a, And(vec![b, c])])
        );
    }

    #[test]
    fn whitespace_between_tokens_only() {
        assert_eq!(parse("  A∧B  ").unwrap(), parse("A ∧ B").unwrap());
        assert_eq!(parse("Apple").unwrap(), atom("Apple"));
        assert!(parse("A pple").is_err());
    }

    #[test]
    fn first_order_terms() {
        let parsed = parse("∀x,y R(x, f(y, c))").unwrap();
        let expected = Universal(
            vec![Formula::symbol("x"), Formula::symbol("y")],
            Box::new(Atomic(Formula::predicate(
                "R",
                Some(vec![
                    Formula::symbol("x"),
                    Formula::function("f", vec![Formula::symbol("y"), Formula::symbol("c")]),
                ]),
            ))),
        );
        assert_eq!(parsed, expected);
        assert!(matches!(parse("exists x P(x)").unwrap(), Existential(..)));
        assert!(matches!(parse("forall x P(x)").unwrap(), Universal(..)));
    }

    #[test]
    fn quantifier_body_is_unary() {
        match parse("∀x P(x) ∧ Q").unwrap() {
            And(ops) => assert!(matches!(ops[0], Universal(..))),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn propositional_dialect_rejects_first_order_syntax() {
        assert!(parse_with(Dialect::Propositional, "A ∧ B").is_ok());
        assert!(parse_with(Dialect::Propositional, "P(a)").is_err());
        assert!(parse_with(Dialect::Propositional, "∀x P").is_err());
    }

    #[test]
    fn truth_constants() {
        assert_eq!(parse("⊤").unwrap(), Tautology);
        assert_eq!(parse("¬⊥").unwrap(), not(Contradiction));
    }

    #[test]
    fn trailing_input_is_an_error() {
        let err = parse("A B").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(err.message.starts_with("Expected end of string"));
    }

    #[test]
    fn chained_conditionals_need_parentheses() {
        assert!(parse("A → B → C").is_err());
        assert!(parse("A ↔ B → C").is_err());
        assert!(parse("A → (B → C)").is_ok());
        assert!(parse("(A ↔ B) → C").is_ok());
    }

    #[test]
    fn furthest_failure_is_reported() {
        let err = parse("(A ∧ B").unwrap_err();
        assert_eq!(err.position, 6);
        assert!(err.message.contains(")"));

        let err = parse("").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.expected.contains(&"negation"));
        assert!(err.expected.contains(&"predicate"));
        assert!(err.message.ends_with("end of string"));
    }

    #[test]
    fn lowercase_statement_is_rejected() {
        assert!(parse("a").is_err());
        assert!(parse("P(A)").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}A", "¬".repeat(MAX_DEPTH + 8));
        let err = parse(&deep).unwrap_err();
        assert!(err.message.contains("Nesting"));
        let shallow = format!("{}A", "¬".repeat(MAX_DEPTH / 2));
        assert!(parse(&shallow).is_ok());
    }
}
