//! Document access and composition errors

use crate::node::NodeKind;
use crate::origin::Origin;
use thiserror::Error;

/// Errors raised by variant-guarded node access and document composition
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocError {
    /// A node was accessed through the wrong variant's accessor
    #[error("accessed node as {expected} but it is {actual} at {origin}")]
    AccessKind {
        /// Kind the accessor expected
        expected: NodeKind,
        /// Kind the node actually has
        actual: NodeKind,
        /// Where the node came from
        origin: Origin,
    },

    /// Two nodes of different kinds were deep-merged
    #[error("cannot merge {lhs} node with {rhs} node at {origin}")]
    MergeKind {
        /// Kind of the left operand
        lhs: NodeKind,
        /// Kind of the right operand
        rhs: NodeKind,
        /// Origin of the left operand
        origin: Origin,
    },

    /// A dictionary lookup failed
    #[error("key {key:?} not found in dictionary at {origin}")]
    MissingKey {
        /// Key that was looked up
        key: String,
        /// Origin of the dictionary node
        origin: Origin,
    },

    /// A list index was out of range
    #[error("index {index} out of range for list of length {len} at {origin}")]
    OutOfRange {
        /// Index that was accessed
        index: usize,
        /// Length of the list
        len: usize,
        /// Origin of the list node
        origin: Origin,
    },
}

impl DocError {
    /// Origin tag of the node involved in the failure.
    pub fn origin(&self) -> &Origin {
        match self {
            DocError::AccessKind { origin, .. }
            | DocError::MergeKind { origin, .. }
            | DocError::MissingKey { origin, .. }
            | DocError::OutOfRange { origin, .. } => origin,
        }
    }
}
