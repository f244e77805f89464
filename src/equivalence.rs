//! Structural comparison with one-directional wildcard binding.

use crate::formula::Formula;
use crate::statement::Statement;
use indexmap::IndexMap;

/// Bindings from wildcard names to the terms they matched
pub type Substitution = IndexMap<String, Formula>;

/// Compares two formulas or statements shape by shape
///
/// A wildcard on either side binds to the opposing subtree the first time
/// it is met. Meeting the same wildcard again succeeds only against a
/// structurally equal subtree; there is no backtracking, so the first
/// binding wins. Composite statements are compared positionally.
pub struct EquivalenceEvaluator<'a> {
    bindings: &'a mut Substitution,
}

impl<'a> EquivalenceEvaluator<'a> {
    /// Creates an evaluator that records new bindings in `bindings`
    pub fn new(bindings: &'a mut Substitution) -> Self {
        Self { bindings }
    }

    /// Returns true iff the two formulas match under the current bindings
    pub fn formulas(&mut self, lhs: &Formula, rhs: &Formula) -> bool {
        match (lhs.is_wildcard(), rhs.is_wildcard()) {
            (true, false) => self.bind(lhs.name(), rhs),
            (false, true) => self.bind(rhs.name(), lhs),
            _ => {
                if lhs.name() != rhs.name() || lhs.is_predicate() != rhs.is_predicate() {
                    return false;
                }
                match (lhs.args(), rhs.args()) {
                    (None, None) => true,
                    (Some(l), Some(r)) => self.formula_lists(l, r),
                    _ => false,
                }
            }
        }
    }

    fn formula_lists(&mut self, lhs: &[Formula], rhs: &[Formula]) -> bool {
        lhs.len() == rhs.len()
            && lhs.iter().zip(rhs).all(|(l, r)| self.formulas(l, r))
    }

    fn bind(&mut self, wildcard: &str, value: &Formula) -> bool {
        match self.bindings.get(wildcard) {
            Some(bound) => bound == value,
            None => {
                self.bindings.insert(wildcard.to_owned(), value.clone());
                true
            }
        }
    }

    /// Returns true iff the two statements match under the current bindings
    pub fn statements(&mut self, lhs: &Statement, rhs: &Statement) -> bool {
        use Statement::*;

        match (lhs, rhs) {
            (Tautology, Tautology) | (Contradiction, Contradiction) => true,
            (Atomic(l), Atomic(r)) => self.formulas(l, r),
            (Not(l), Not(r)) => self.statements(l, r),
            (And(l), And(r)) | (Or(l), Or(r)) => self.statement_lists(l, r),
            (Conditional(l1, l2), Conditional(r1, r2))
            | (Biconditional(l1, l2), Biconditional(r1, r2)) => {
                self.statements(l1, r1) && self.statements(l2, r2)
            }
            (Universal(lv, lb), Universal(rv, rb))
            | (Existential(lv, lb), Existential(rv, rb)) => {
                self.formula_lists(lv, rv) && self.statements(lb, rb)
            }
            _ => false,
        }
    }

    fn statement_lists(&mut self, lhs: &[Statement], rhs: &[Statement]) -> bool {
        lhs.len() == rhs.len()
            && lhs.iter().zip(rhs).all(|(l, r)| self.statements(l, r))
    }
}
