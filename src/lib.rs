//! Truth-tree data structures and checking.
//!
//! A truth tree is a proof in which every node holds a logical statement.
//! Compound statements are expanded ("decomposed") into simpler ones further
//! down the tree, possibly across several branches, until each branch is
//! either closed by a contradiction or left open.
//!
//! The main data structure, [`TruthTree`], owns its nodes and checks each
//! step: [`TruthTree::is_valid`] asks whether a node is justified by the
//! statement it claims to decompose, [`TruthTree::is_decomposed`] whether a
//! statement has been fully expanded, and [`TruthTree::is_correct`] whether
//! the whole tree is a finished proof. Problems a student could make are
//! reported as [`Diagnostics`]; only corrupted trees produce errors.
//!
//! Statements are parsed with [`parser::parse`], which understands both
//! propositional and first-order syntax with several spellings for each
//! operator. Trees are loaded and stored as JSON lists of [`NodeRecord`]s
//! with [`TruthTree::deserialize`] and [`TruthTree::serialize`].

/// Validity, decomposition, and whole-tree checks for truth trees
pub mod algo;

mod convert;
mod core;
mod equivalence;
mod sets;

pub mod error;
pub mod formula;
pub mod parser;
pub mod statement;

pub use crate::core::*;
pub use convert::NodeRecord;
pub use equivalence::{EquivalenceEvaluator, Substitution};
pub use error::{DeserializationError, EditError, InconsistencyError, ParseError};
pub use formula::Formula;
pub use parser::{parse, parse_with, Dialect};
pub use statement::Statement;
