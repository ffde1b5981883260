//! Reification errors
//!
//! Failures at any recursion depth surface as a [`ReifyError`]. Frames that
//! catch an error without an origin tag wrap it in a `Context` layer, so a
//! failure deep inside a document produces a chain from the outermost file
//! position down to the innermost cause; [`ReifyError::innermost`] recovers
//! the most specific message. Errors that already carry an origin are never
//! re-wrapped, keeping the deepest location first.

use std::any;
use thiserror::Error;
use vellum_doc::{DocError, DocNode, Origin};

/// Reification result
pub type ReifyResult<T> = Result<T, ReifyError>;

/// Errors raised while reifying a document into a typed value
#[derive(Debug, Error)]
pub enum ReifyError {
    /// A document node was navigated with the wrong variant's accessor
    #[error(transparent)]
    Doc(#[from] DocError),

    /// Scalar text could not become the target primitive or enum
    #[error("cannot convert {text:?} into {target} at {origin}")]
    Conversion {
        /// Target type name
        target: &'static str,
        /// Offending scalar text
        text: String,
        /// Where the scalar came from
        origin: Origin,
    },

    /// Required members absent from the document, aggregated over one walk
    #[error("type {type_name} is missing doc fields: {list} at {origin}", list = .fields.join(", "))]
    MissingFields {
        /// Type being reified
        type_name: &'static str,
        /// Every required member whose key was absent
        fields: Vec<String>,
        /// Origin of the dictionary node
        origin: Origin,
    },

    /// Document keys consumed by no member, aggregated over one walk
    #[error("type {type_name} has extra doc fields: {list} at {origin}", list = .keys.join(", "))]
    ExtraFields {
        /// Type being reified
        type_name: &'static str,
        /// Every unconsumed document key
        keys: Vec<String>,
        /// Origin of the dictionary node
        origin: Origin,
    },

    /// Structurally impossible reification (ambiguous shorthand, bad union key)
    #[error("{message} at {origin}")]
    Structural {
        /// What went wrong
        message: String,
        /// Where it went wrong
        origin: Origin,
    },

    /// Failure reported by a user-supplied hook
    #[error("{message}")]
    Hook {
        /// Hook-supplied failure text
        message: String,
    },

    /// Outer wrapper attaching a document position to an origin-less cause
    #[error("at {origin}: {source}")]
    Context {
        /// Position of the node being read when the cause surfaced
        origin: Origin,
        /// The wrapped cause
        source: Box<ReifyError>,
    },
}

impl ReifyError {
    /// Build a hook failure; the reifier attaches the document position.
    pub fn hook(message: impl Into<String>) -> Self {
        ReifyError::Hook { message: message.into() }
    }

    pub(crate) fn conversion_to(target: &'static str, text: &str, node: &DocNode) -> Self {
        ReifyError::Conversion {
            target,
            text: text.to_owned(),
            origin: node.origin().clone(),
        }
    }

    pub(crate) fn conversion<T>(text: &str, node: &DocNode) -> Self {
        Self::conversion_to(any::type_name::<T>(), text, node)
    }

    pub(crate) fn structural(message: impl Into<String>, node: &DocNode) -> Self {
        ReifyError::Structural {
            message: message.into(),
            origin: node.origin().clone(),
        }
    }

    /// Document position attached to this error, if any.
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            ReifyError::Doc(doc) => Some(doc.origin()),
            ReifyError::Conversion { origin, .. }
            | ReifyError::MissingFields { origin, .. }
            | ReifyError::ExtraFields { origin, .. }
            | ReifyError::Structural { origin, .. }
            | ReifyError::Context { origin, .. } => Some(origin),
            ReifyError::Hook { .. } => None,
        }
    }

    /// The deepest cause in the context chain, i.e. the most specific failure.
    pub fn innermost(&self) -> &ReifyError {
        match self {
            ReifyError::Context { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Wrap with the node's position unless a position is already attached.
    pub(crate) fn with_origin(self, node: &DocNode) -> Self {
        if self.origin().is_some() {
            self
        } else {
            ReifyError::Context {
                origin: node.origin().clone(),
                source: Box::new(self),
            }
        }
    }
}
