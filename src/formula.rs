//! Terms and predicate applications.

use crate::equivalence::{EquivalenceEvaluator, Substitution};
use indexmap::IndexSet;
use std::fmt;

/// A term or the head of an atomic relation
///
/// A formula without arguments that is not a predicate is a constant or a
/// variable; with arguments it is a function application. Predicates are
/// the heads of atomic statements and never count as constants.
///
/// Wildcards are bound variables that have been symbolized for matching:
/// the [`EquivalenceEvaluator`] binds them to whatever they are compared
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula {
    name: String,
    args: Option<Vec<Formula>>,
    predicate: bool,
    wildcard: bool,
}

/// # Construction
impl Formula {
    /// Constructs a new formula
    pub fn new(
        name: impl Into<String>,
        args: Option<Vec<Formula>>,
        predicate: bool,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            predicate,
            wildcard: false,
        }
    }

    /// Constructs a constant or variable
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::new(name, None, false)
    }

    /// Constructs a function application
    pub fn function(name: impl Into<String>, args: Vec<Formula>) -> Self {
        Self::new(name, Some(args), false)
    }

    /// Constructs a predicate, optionally applied to arguments
    pub fn predicate(name: impl Into<String>, args: Option<Vec<Formula>>) -> Self {
        Self::new(name, args, true)
    }

    /// Constructs a wildcard that matches any term once
    pub fn wildcard(name: impl Into<String>) -> Self {
        Self {
            wildcard: true,
            ..Self::symbol(name)
        }
    }
}

/// # Accessors
impl Formula {
    /// Returns the function, predicate, or symbol name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments, if this formula is applied to any
    pub fn args(&self) -> Option<&[Formula]> {
        self.args.as_deref()
    }

    /// Returns true iff this formula heads an atomic relation
    pub fn is_predicate(&self) -> bool {
        self.predicate
    }

    /// Returns true iff this formula is a symbolized bound variable
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}

/// # Operations
impl Formula {
    /// Returns true iff this formula matches `other` with no prior bindings
    pub fn equals(&self, other: &Formula) -> bool {
        let mut bindings = Substitution::new();
        EquivalenceEvaluator::new(&mut bindings).formulas(self, other)
    }

    /// Returns true iff this formula matches `other` given the wildcard
    /// bindings made so far; new bindings are recorded in `bindings`
    pub fn is_mapped_equals(
        &self,
        other: &Formula,
        bindings: &mut Substitution,
    ) -> bool {
        EquivalenceEvaluator::new(bindings).formulas(self, other)
    }

    /// Returns the constants of this formula, ignoring the names in `bound`
    ///
    /// A function application is itself a constant only when every argument
    /// is closed (contains no bound symbol).
    pub fn constants(&self, bound: &[Formula]) -> IndexSet<Formula> {
        let mut constants = IndexSet::new();
        self.collect_constants(bound, &mut constants);
        constants
    }

    fn collect_constants(&self, bound: &[Formula], out: &mut IndexSet<Formula>) {
        match &self.args {
            None => {
                if !self.predicate && !self.wildcard && !self.is_bound(bound) {
                    out.insert(self.clone());
                }
            }
            Some(args) => {
                for arg in args {
                    arg.collect_constants(bound, out);
                }
                if !self.predicate && self.is_closed(bound) {
                    out.insert(self.clone());
                }
            }
        }
    }

    fn is_bound(&self, bound: &[Formula]) -> bool {
        bound.iter().any(|b| b.name == self.name)
    }

    /// Returns true iff no symbol of this formula is bound or a wildcard
    fn is_closed(&self, bound: &[Formula]) -> bool {
        match &self.args {
            None => self.predicate || (!self.wildcard && !self.is_bound(bound)),
            Some(args) => args.iter().all(|arg| arg.is_closed(bound)),
        }
    }

    /// Returns a copy in which every occurrence of a name in `bound` is a
    /// wildcard
    pub fn symbolized(&self, bound: &[Formula]) -> Formula {
        Formula {
            name: self.name.clone(),
            args: self
                .args
                .as_ref()
                .map(|args| args.iter().map(|arg| arg.symbolized(bound)).collect()),
            predicate: self.predicate,
            wildcard: self.wildcard || (!self.predicate && self.is_bound(bound)),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.args {
            None => write!(f, "{}", self.name),
            Some(args) => {
                write!(f, "{}(", self.name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Formula {
        Formula::symbol(name)
    }

    #[test]
    fn display_forms() {
        assert_eq!(sym("a").to_string(), "a");
        let f = Formula::function("f", vec![sym("a"), Formula::function("g", vec![sym("b")])]);
        assert_eq!(f.to_string(), "f(a,g(b))");
        assert_eq!(Formula::predicate("P", None).to_string(), "P");
    }

    #[test]
    fn constants_skip_bound_symbols_and_predicates() {
        let x = sym("x");
        let p = Formula::predicate(
            "P",
            Some(vec![x.clone(), sym("a"), Formula::function("f", vec![sym("b")])]),
        );
        let constants = p.constants(&[x]);
        let names: Vec<String> = constants.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "f(b)"]);
    }

    #[test]
    fn function_over_bound_symbol_is_not_constant() {
        let x = sym("x");
        let f = Formula::function("f", vec![x.clone(), sym("a")]);
        let constants = f.constants(&[x]);
        assert_eq!(constants.len(), 1);
        assert!(constants.contains(&sym("a")));
    }

    #[test]
    fn constants_are_deduplicated() {
        let p = Formula::predicate("R", Some(vec![sym("a"), sym("a")]));
        assert_eq!(p.constants(&[]).len(), 1);
    }

    #[test]
    fn symbolized_marks_only_bound_names() {
        let p = Formula::predicate("P", Some(vec![sym("x"), sym("y")]));
        let s = p.symbolized(&[sym("x")]);
        let args = s.args().unwrap();
        assert!(args[0].is_wildcard());
        assert!(!args[1].is_wildcard());
        assert!(!s.is_wildcard());
    }

    #[test]
    fn wildcard_binding_conflicts() {
        let mut bindings = Substitution::new();
        assert!(Formula::wildcard("x").is_mapped_equals(&sym("a"), &mut bindings));
        assert_eq!(bindings.get("x"), Some(&sym("a")));
        assert!(!Formula::wildcard("x").is_mapped_equals(&sym("b"), &mut bindings));
        assert!(Formula::wildcard("x").is_mapped_equals(&sym("a"), &mut bindings));
    }

    #[test]
    fn plain_equality_is_structural() {
        let a = Formula::function("f", vec![sym("a")]);
        assert!(a.equals(&Formula::function("f", vec![sym("a")])));
        assert!(!a.equals(&Formula::function("f", vec![sym("b")])));
        assert!(!a.equals(&Formula::function("f", vec![sym("a"), sym("a")])));
        assert!(!sym("f").equals(&a));
    }
}
