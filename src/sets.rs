//! Set helpers shared by statements and the validity engine.

use indexmap::IndexSet;
use std::hash::Hash;

/// Returns true iff every element of `a` is in `b`
pub fn is_subset<T: Hash + Eq>(a: &IndexSet<T>, b: &IndexSet<T>) -> bool {
    a.iter().all(|x| b.contains(x))
}

/// Returns true iff `a` and `b` hold the same elements, in any order
pub fn is_equal<T: Hash + Eq>(a: &IndexSet<T>, b: &IndexSet<T>) -> bool {
    a.len() == b.len() && is_subset(a, b)
}

/// Returns true iff `actual` is a permutation of `expected` under `matches`
///
/// Each expected element claims a distinct actual element, so repeated
/// elements must be repeated on both sides.
pub fn multiset_matches<T>(
    expected: &[T],
    actual: &[T],
    matches: impl Fn(&T, &T) -> bool,
) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    let mut used = vec![false; actual.len()];
    expected.iter().all(|e| {
        match (0..actual.len()).find(|&i| !used[i] && matches(e, &actual[i])) {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Returns true iff the groups of `actual` can be paired one-to-one with
/// the groups of `expected` so that paired groups are equal as multisets
///
/// Pairing is greedy: each expected group takes the first unpaired actual
/// group that matches it.
pub fn groups_pair_up<T>(
    expected: &[Vec<T>],
    actual: &[Vec<T>],
    matches: impl Fn(&T, &T) -> bool,
) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    let mut paired = vec![false; actual.len()];
    expected.iter().all(|group| {
        match (0..actual.len())
            .find(|&i| !paired[i] && multiset_matches(group, &actual[i], &matches))
        {
            Some(i) => {
                paired[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Returns every tuple of length `arity` drawn from `universe`
pub fn cartesian_power<T: Clone>(universe: &[T], arity: usize) -> Vec<Vec<T>> {
    (0..arity).fold(vec![vec![]], |tuples, _| {
        tuples
            .iter()
            .flat_map(|prefix| {
                universe.iter().map(move |value| {
                    let mut tuple = prefix.clone();
                    tuple.push(value.clone());
                    tuple
                })
            })
            .collect()
    })
}
