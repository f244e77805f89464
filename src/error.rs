//! Error types.
//!
//! Ordinary "this step is wrong" outcomes are not errors; they are reported
//! as [`Diagnostics`](crate::Diagnostics). The types here cover text that
//! cannot be parsed, serialized trees that cannot be loaded, trees whose
//! structure is corrupted, and edits that cannot be applied.

use std::fmt;

use thiserror::Error;

use crate::core::NodeId;

////////////////////////////////////////////////////////////////////////////////
// Parsing

/// Raised when statement text does not match the grammar
///
/// `position` is a char offset into the input. When several alternatives
/// failed at the same furthest position, `expected` names all of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
    pub expected: Vec<&'static str>,
}

impl ParseError {
    /// Builds an error for a single failed rule
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            expected: vec![],
        }
    }

    /// Builds the error reported when several rules tie at `position`
    pub fn tied(position: usize, rules: Vec<&'static str>, found: Found) -> Self {
        Self {
            position,
            message: format!("Expected {} but got {}", rules.join(" or "), found),
            expected: rules,
        }
    }
}

/// What the parser saw where it expected something else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    Char(char),
    End,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "'{}'", c),
            Self::End => write!(f, "end of string"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Loading

/// Raised when a serialized tree is structurally malformed
///
/// No partial tree is ever produced alongside one of these.
#[derive(Error, Debug)]
pub enum DeserializationError {
    #[error("serialized tree has no nodes")]
    Empty,

    #[error("malformed tree: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate node {0}")]
    DuplicateNode(NodeId),

    #[error("multiple roots: nodes {0} and {1} both have no parent")]
    MultipleRoots(NodeId, NodeId),

    #[error("no root: every node has a parent")]
    NoRoot,
}

////////////////////////////////////////////////////////////////////////////////
// Corruption

/// Raised when the validity engine meets a state the tree invariants rule out
///
/// These signal a corrupted tree rather than a student mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InconsistencyError {
    #[error("node {0} does not exist")]
    MissingNode(NodeId),

    #[error("node {0} has no parent")]
    MissingParent(NodeId),

    #[error("node {target} was reached twice while checking the decomposition of node {origin}")]
    RevisitedDecomposition { origin: NodeId, target: NodeId },

    #[error("the ancestors of node {0} form a cycle")]
    Cycle(NodeId),

    #[error("node {origin} cites node {target} which is not below it")]
    DecompositionNotBelow { origin: NodeId, target: NodeId },

    #[error("node {child} names {parent} as parent but is not one of its children")]
    ChildParentMismatch { parent: NodeId, child: NodeId },

    #[error("closed terminator {0} must cite exactly two statements")]
    ClosedReferenceCount(NodeId),

    #[error("closed terminator {origin} cites node {target} which is not above it")]
    ClosedReferenceNotAncestor { origin: NodeId, target: NodeId },

    #[error("the recorded leaves do not match the childless nodes")]
    Leaves,
}

////////////////////////////////////////////////////////////////////////////////
// Editing

/// Raised when an edit cannot be applied to a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("root {0} cannot be deleted while it has more than one child")]
    RootHasBranches(NodeId),

    #[error("the last node of a tree cannot be deleted")]
    LastNode,
}
