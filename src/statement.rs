//! Statements and their truth-tree decomposition rules.

use crate::equivalence::{EquivalenceEvaluator, Substitution};
use crate::formula::Formula;
use crate::sets;
use indexmap::IndexSet;
use std::fmt;

/// A propositional or first-order statement
///
/// `And` and `Or` hold any number of operands. Their order matters when two
/// statements are compared, but not when a decomposition is matched (see
/// [`Statement::has_decomposition`]). Quantifiers bind a non-empty list of
/// symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Tautology,
    Contradiction,
    Atomic(Formula),
    Not(Box<Statement>),
    And(Vec<Statement>),
    Or(Vec<Statement>),
    Conditional(Box<Statement>, Box<Statement>),
    Biconditional(Box<Statement>, Box<Statement>),
    Universal(Vec<Formula>, Box<Statement>),
    Existential(Vec<Formula>, Box<Statement>),
}

use Statement::*;

/// # Classification
impl Statement {
    /// Returns true iff this is an atomic statement
    pub fn is_atomic(&self) -> bool {
        matches!(self, Atomic(_))
    }

    /// Returns true iff this is an atomic statement or the negation of one
    pub fn is_literal(&self) -> bool {
        match self {
            Atomic(_) => true,
            Not(inner) => inner.is_atomic(),
            _ => false,
        }
    }

    /// Returns the negation of this statement
    pub fn negated(&self) -> Statement {
        Not(Box::new(self.clone()))
    }

    /// Returns true iff one of the two statements is the exact negation of
    /// the other; with `atomic_only`, the un-negated side must be atomic
    pub fn contradicts(&self, other: &Statement, atomic_only: bool) -> bool {
        let negates = |positive: &Statement, negative: &Statement| match negative {
            Not(inner) => {
                (!atomic_only || positive.is_atomic()) && inner.equals(positive)
            }
            _ => false,
        };
        negates(self, other) || negates(other, self)
    }
}

/// # Decomposition
impl Statement {
    /// Returns the branches this statement expands into
    ///
    /// Each inner vector is one branch holding every statement that must
    /// appear on it. Literals, tautologies, and contradictions expand into
    /// nothing. A quantifier expands into one generic instance whose bound
    /// symbols are wildcards.
    pub fn decompose(&self) -> Vec<Vec<Statement>> {
        match self {
            Tautology | Contradiction | Atomic(_) => vec![],
            Not(inner) => match inner.as_ref() {
                Tautology | Contradiction | Atomic(_) => vec![],
                Not(s) => vec![vec![s.as_ref().clone()]],
                And(ops) => ops.iter().map(|op| vec![op.negated()]).collect(),
                Or(ops) => vec![ops.iter().map(|op| op.negated()).collect()],
                Conditional(lhs, rhs) => vec![vec![lhs.as_ref().clone(), rhs.negated()]],
                Biconditional(lhs, rhs) => vec![
                    vec![lhs.as_ref().clone(), rhs.negated()],
                    vec![lhs.negated(), rhs.as_ref().clone()],
                ],
                Existential(vars, body) => {
                    vec![vec![Universal(vars.clone(), Box::new(body.negated()))]]
                }
                Universal(vars, body) => {
                    vec![vec![Existential(vars.clone(), Box::new(body.negated()))]]
                }
            },
            And(ops) => vec![ops.clone()],
            Or(ops) => ops.iter().map(|op| vec![op.clone()]).collect(),
            Conditional(lhs, rhs) => vec![vec![lhs.negated()], vec![rhs.as_ref().clone()]],
            Biconditional(lhs, rhs) => vec![
                vec![lhs.as_ref().clone(), rhs.as_ref().clone()],
                vec![lhs.negated(), rhs.negated()],
            ],
            Universal(..) | Existential(..) => vec![vec![self.symbolized(&[])]],
        }
    }

    /// Returns true iff `branches` realize this statement's decomposition
    ///
    /// Branches may come in any order and statements within a branch may
    /// come in any order, but every expected statement needs its own match
    /// and branch sizes must agree.
    pub fn has_decomposition(&self, branches: &[Vec<Statement>]) -> bool {
        sets::groups_pair_up(&self.decompose(), branches, |expected, actual| {
            expected.equals(actual)
        })
    }
}

/// # Comparison
impl Statement {
    /// Returns true iff this statement matches `other` with no prior bindings
    pub fn equals(&self, other: &Statement) -> bool {
        self.equals_map(other).is_some()
    }

    /// Returns the wildcard bindings under which this statement matches
    /// `other`, or `None` if it does not
    pub fn equals_map(&self, other: &Statement) -> Option<Substitution> {
        let mut bindings = Substitution::new();
        if self.is_mapped_equals(other, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    /// Returns true iff this statement matches `other` given the bindings
    /// made so far; new bindings are recorded in `bindings`
    pub fn is_mapped_equals(&self, other: &Statement, bindings: &mut Substitution) -> bool {
        EquivalenceEvaluator::new(bindings).statements(self, other)
    }
}

/// # Constants and symbolization
impl Statement {
    /// Returns the constants of this statement, ignoring the names in
    /// `bound` and the symbols bound by inner quantifiers
    pub fn constants(&self, bound: &[Formula]) -> IndexSet<Formula> {
        let mut constants = IndexSet::new();
        self.collect_constants(bound, &mut constants);
        constants
    }

    fn collect_constants(&self, bound: &[Formula], out: &mut IndexSet<Formula>) {
        match self {
            Tautology | Contradiction => {}
            Atomic(formula) => out.extend(formula.constants(bound)),
            Not(inner) => inner.collect_constants(bound, out),
            And(ops) | Or(ops) => {
                for op in ops {
                    op.collect_constants(bound, out);
                }
            }
            Conditional(lhs, rhs) | Biconditional(lhs, rhs) => {
                lhs.collect_constants(bound, out);
                rhs.collect_constants(bound, out);
            }
            Universal(vars, body) | Existential(vars, body) => {
                let inner: Vec<Formula> = bound.iter().chain(vars).cloned().collect();
                body.collect_constants(&inner, out);
            }
        }
    }

    /// Returns the constants of this statement that do not appear in
    /// `universe`
    pub fn new_constants(&self, universe: &IndexSet<Formula>) -> IndexSet<Formula> {
        self.constants(&[])
            .into_iter()
            .filter(|c| !universe.iter().any(|u| u.equals(c)))
            .collect()
    }

    /// Returns a copy in which every free occurrence of a name in `bound` is
    /// a wildcard
    ///
    /// Asked with no names, a quantifier instead returns its body with its
    /// own bound symbols turned into wildcards, the generic instance that
    /// instantiations are matched against.
    pub fn symbolized(&self, bound: &[Formula]) -> Statement {
        match self {
            Universal(vars, body) | Existential(vars, body) if bound.is_empty() => {
                body.symbolize_free(vars)
            }
            _ => self.symbolize_free(bound),
        }
    }

    fn symbolize_free(&self, bound: &[Formula]) -> Statement {
        if bound.is_empty() {
            return self.clone();
        }
        match self {
            Tautology | Contradiction => self.clone(),
            Atomic(formula) => Atomic(formula.symbolized(bound)),
            Not(inner) => Not(Box::new(inner.symbolize_free(bound))),
            And(ops) => And(ops.iter().map(|op| op.symbolize_free(bound)).collect()),
            Or(ops) => Or(ops.iter().map(|op| op.symbolize_free(bound)).collect()),
            Conditional(lhs, rhs) => Conditional(
                Box::new(lhs.symbolize_free(bound)),
                Box::new(rhs.symbolize_free(bound)),
            ),
            Biconditional(lhs, rhs) => Biconditional(
                Box::new(lhs.symbolize_free(bound)),
                Box::new(rhs.symbolize_free(bound)),
            ),
            Universal(vars, body) => {
                Universal(vars.clone(), Box::new(body.symbolize_free(&unshadowed(bound, vars))))
            }
            Existential(vars, body) => Existential(
                vars.clone(),
                Box::new(body.symbolize_free(&unshadowed(bound, vars))),
            ),
        }
    }

    /// Returns this statement with nested `And`s absorbed into their parent
    /// `And` (likewise for `Or`)
    pub fn flattened(self) -> Statement {
        match self {
            And(ops) => {
                let mut out = Vec::with_capacity(ops.len());
                for op in ops {
                    match op.flattened() {
                        And(inner) => out.extend(inner),
                        other => out.push(other),
                    }
                }
                And(out)
            }
            Or(ops) => {
                let mut out = Vec::with_capacity(ops.len());
                for op in ops {
                    match op.flattened() {
                        Or(inner) => out.extend(inner),
                        other => out.push(other),
                    }
                }
                Or(out)
            }
            Not(inner) => Not(Box::new(inner.flattened())),
            Conditional(lhs, rhs) => {
                Conditional(Box::new(lhs.flattened()), Box::new(rhs.flattened()))
            }
            Biconditional(lhs, rhs) => {
                Biconditional(Box::new(lhs.flattened()), Box::new(rhs.flattened()))
            }
            Universal(vars, body) => Universal(vars, Box::new(body.flattened())),
            Existential(vars, body) => Existential(vars, Box::new(body.flattened())),
            other => other,
        }
    }
}

/// Drops the names an inner quantifier rebinds
fn unshadowed(bound: &[Formula], vars: &[Formula]) -> Vec<Formula> {
    bound
        .iter()
        .filter(|b| !vars.iter().any(|v| v.name() == b.name()))
        .cloned()
        .collect()
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn joined(f: &mut fmt::Formatter, ops: &[Statement], glyph: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, op) in ops.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", glyph)?;
                }
                write!(f, "{}", op)?;
            }
            write!(f, ")")
        }

        fn quantified(
            f: &mut fmt::Formatter,
            glyph: &str,
            vars: &[Formula],
            body: &Statement,
        ) -> fmt::Result {
            write!(f, "{}", glyph)?;
            for (i, var) in vars.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", var)?;
            }
            write!(f, " {}", body)
        }

        match self {
            Tautology => write!(f, "⊤"),
            Contradiction => write!(f, "⊥"),
            Atomic(formula) => write!(f, "{}", formula),
            Not(inner) => write!(f, "¬{}", inner),
            And(ops) => joined(f, ops, "∧"),
            Or(ops) => joined(f, ops, "∨"),
            Conditional(lhs, rhs) => write!(f, "({} → {})", lhs, rhs),
            Biconditional(lhs, rhs) => write!(f, "({} ↔ {})", lhs, rhs),
            Universal(vars, body) => quantified(f, "∀", vars, body),
            Existential(vars, body) => quantified(f, "∃", vars, body),
        }
    }
}
