//! Origin tags for document nodes
//!
//! Every node carries a human-readable description of where it came from
//! (typically `file:line`). Synthetic nodes produced by composition carry a
//! tag built from their sources, so diagnostics always point somewhere
//! useful even for documents that never existed on disk.

use std::fmt;
use std::sync::Arc;

/// Human-readable source location attached to a document node.
///
/// Cheap to clone; every node in a parsed tree typically shares a handful
/// of distinct tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(Arc<str>);

impl Origin {
    /// Create an origin tag from any displayable location string.
    pub fn new(tag: impl Into<String>) -> Self {
        Origin(tag.into().into())
    }

    /// Placeholder for nodes with no better source information.
    pub fn unknown() -> Self {
        Origin::new("<unknown>")
    }

    /// Origin of a node combined from several source documents.
    pub fn combined<'a>(sources: impl IntoIterator<Item = &'a Origin>) -> Self {
        let parts: Vec<&str> = sources.into_iter().map(|o| o.as_str()).collect();
        Origin::new(format!("combination of: [{}]", parts.join(", ")))
    }

    /// Origin of a node produced by merging two documents.
    pub fn merged(lhs: &Origin, rhs: &Origin) -> Self {
        Origin::new(format!("merging of: [{}, {}]", lhs, rhs))
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Origin {
    fn from(tag: &str) -> Self {
        Origin::new(tag)
    }
}
