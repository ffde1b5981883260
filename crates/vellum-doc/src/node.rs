//! Tagged document nodes
//!
//! `DocNode` is the union type produced by parsing a configuration
//! document. It requires no downcasting but behaves differently depending
//! on the underlying kind; every variant-specific accessor is guarded and
//! fails with [`DocError::AccessKind`] when called against the wrong kind.
//! All dictionaries have string keys.

use crate::error::DocError;
use crate::origin::Origin;
use indexmap::IndexMap;
use std::fmt;

/// Kind of data contained in a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Ordered string-keyed mapping
    Dictionary,
    /// Ordered sequence
    List,
    /// String payload interpretable as bool/number/text/enum-name
    Scalar,
    /// Parse failure or empty input
    Absent,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Dictionary => write!(f, "dictionary"),
            NodeKind::List => write!(f, "list"),
            NodeKind::Scalar => write!(f, "scalar"),
            NodeKind::Absent => write!(f, "absent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Dictionary(IndexMap<String, DocNode>),
    List(Vec<DocNode>),
    Scalar(String),
    Absent,
}

/// A node of a parsed document tree.
///
/// Parser-produced trees are held behind `&` and are immutable in practice;
/// the same type doubles as the mutable composition node when held behind
/// `&mut` (assembling synthetic dictionaries, merging files).
#[derive(Debug, Clone)]
pub struct DocNode {
    repr: Repr,
    origin: Origin,
}

impl DocNode {
    /// Create a scalar node.
    pub fn scalar(text: impl Into<String>, origin: Origin) -> Self {
        DocNode { repr: Repr::Scalar(text.into()), origin }
    }

    /// Create an empty list node.
    pub fn list(origin: Origin) -> Self {
        DocNode { repr: Repr::List(Vec::new()), origin }
    }

    /// Create a list node from elements.
    pub fn list_of(items: impl IntoIterator<Item = DocNode>, origin: Origin) -> Self {
        DocNode { repr: Repr::List(items.into_iter().collect()), origin }
    }

    /// Create an empty dictionary node.
    pub fn dictionary(origin: Origin) -> Self {
        DocNode { repr: Repr::Dictionary(IndexMap::new()), origin }
    }

    /// Create an absent node (parse failure or empty input).
    pub fn absent(origin: Origin) -> Self {
        DocNode { repr: Repr::Absent, origin }
    }

    /// Kind of data contained in this node.
    pub fn kind(&self) -> NodeKind {
        match &self.repr {
            Repr::Dictionary(_) => NodeKind::Dictionary,
            Repr::List(_) => NodeKind::List,
            Repr::Scalar(_) => NodeKind::Scalar,
            Repr::Absent => NodeKind::Absent,
        }
    }

    /// Where this node came from.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// True if this is a dictionary node.
    pub fn is_dictionary(&self) -> bool {
        matches!(self.repr, Repr::Dictionary(_))
    }

    /// True if this is a list node.
    pub fn is_list(&self) -> bool {
        matches!(self.repr, Repr::List(_))
    }

    /// True if this is a scalar node.
    pub fn is_scalar(&self) -> bool {
        matches!(self.repr, Repr::Scalar(_))
    }

    /// True if this is an absent node.
    pub fn is_absent(&self) -> bool {
        matches!(self.repr, Repr::Absent)
    }

    fn access_error(&self, expected: NodeKind) -> DocError {
        DocError::AccessKind {
            expected,
            actual: self.kind(),
            origin: self.origin.clone(),
        }
    }

    /// Number of items in a dictionary or list node.
    pub fn count(&self) -> Result<usize, DocError> {
        match &self.repr {
            Repr::Dictionary(map) => Ok(map.len()),
            Repr::List(items) => Ok(items.len()),
            _ => Err(self.access_error(NodeKind::List)),
        }
    }

    /// Access the node as a list, by position.
    pub fn get(&self, index: usize) -> Result<&DocNode, DocError> {
        let items = self.items()?;
        items.get(index).ok_or_else(|| DocError::OutOfRange {
            index,
            len: items.len(),
            origin: self.origin.clone(),
        })
    }

    /// Access the node as a dictionary, by key.
    pub fn get_key(&self, key: &str, ignore_case: bool) -> Result<&DocNode, DocError> {
        self.try_get_key(key, ignore_case)?
            .ok_or_else(|| DocError::MissingKey {
                key: key.to_owned(),
                origin: self.origin.clone(),
            })
    }

    /// Look up a key in a dictionary node, returning `None` when absent.
    ///
    /// Case-insensitive lookups try an exact match first, then fall back to
    /// an ASCII-case-insensitive scan in insertion order.
    pub fn try_get_key(&self, key: &str, ignore_case: bool) -> Result<Option<&DocNode>, DocError> {
        let map = self.entries()?;
        if let Some(value) = map.get(key) {
            return Ok(Some(value));
        }
        if ignore_case {
            for (existing, value) in map {
                if existing.eq_ignore_ascii_case(key) {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    /// True if the dictionary contains the key.
    pub fn contains_key(&self, key: &str, ignore_case: bool) -> Result<bool, DocError> {
        Ok(self.try_get_key(key, ignore_case)?.is_some())
    }

    /// Value of a scalar node as text.
    pub fn as_scalar(&self) -> Result<&str, DocError> {
        match &self.repr {
            Repr::Scalar(text) => Ok(text),
            _ => Err(self.access_error(NodeKind::Scalar)),
        }
    }

    /// Iterate over the values of a list node.
    pub fn values(&self) -> Result<std::slice::Iter<'_, DocNode>, DocError> {
        Ok(self.items()?.iter())
    }

    /// Iterate over the key/value pairs of a dictionary node.
    pub fn pairs(&self) -> Result<indexmap::map::Iter<'_, String, DocNode>, DocError> {
        Ok(self.entries()?.iter())
    }

    /// Check a list node for an element whose scalar text equals `text`.
    pub fn contains_scalar(&self, text: &str) -> Result<bool, DocError> {
        for item in self.values()? {
            if matches!(&item.repr, Repr::Scalar(s) if s == text) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append an element to a list node.
    pub fn push(&mut self, node: DocNode) -> Result<(), DocError> {
        match &mut self.repr {
            Repr::List(items) => {
                items.push(node);
                Ok(())
            }
            _ => Err(self.access_error(NodeKind::List)),
        }
    }

    /// Insert a key into a dictionary node, returning any replaced value.
    pub fn insert(&mut self, key: impl Into<String>, node: DocNode) -> Result<Option<DocNode>, DocError> {
        match &mut self.repr {
            Repr::Dictionary(map) => Ok(map.insert(key.into(), node)),
            _ => Err(self.access_error(NodeKind::Dictionary)),
        }
    }

    /// Replace the text of a scalar node.
    pub fn set_scalar(&mut self, text: impl Into<String>) -> Result<(), DocError> {
        match &mut self.repr {
            Repr::Scalar(s) => {
                *s = text.into();
                Ok(())
            }
            _ => Err(self.access_error(NodeKind::Scalar)),
        }
    }

    /// Remove a key from a dictionary node, preserving insertion order.
    pub fn remove_key(&mut self, key: &str) -> Result<Option<DocNode>, DocError> {
        match &mut self.repr {
            Repr::Dictionary(map) => Ok(map.shift_remove(key)),
            _ => Err(self.access_error(NodeKind::Dictionary)),
        }
    }

    /// Remove an element from a list node.
    pub fn remove_at(&mut self, index: usize) -> Result<DocNode, DocError> {
        match &mut self.repr {
            Repr::List(items) => {
                if index >= items.len() {
                    return Err(DocError::OutOfRange {
                        index,
                        len: items.len(),
                        origin: self.origin.clone(),
                    });
                }
                Ok(items.remove(index))
            }
            _ => Err(self.access_error(NodeKind::List)),
        }
    }

    fn items(&self) -> Result<&Vec<DocNode>, DocError> {
        match &self.repr {
            Repr::List(items) => Ok(items),
            _ => Err(self.access_error(NodeKind::List)),
        }
    }

    fn entries(&self) -> Result<&IndexMap<String, DocNode>, DocError> {
        match &self.repr {
            Repr::Dictionary(map) => Ok(map),
            _ => Err(self.access_error(NodeKind::Dictionary)),
        }
    }
}

/// Structural equality: same kind and recursively equal contents.
/// Dictionary comparison ignores key order, list comparison does not.
/// Origin tags never participate.
impl PartialEq for DocNode {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

// Display mirrors the shape of the node without dumping whole subtrees.
impl fmt::Display for DocNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Dictionary(map) => write!(f, "dictionary({} keys)", map.len()),
            Repr::List(items) => write!(f, "list({} items)", items.len()),
            Repr::Scalar(text) => write!(f, "scalar({:?})", text),
            Repr::Absent => write!(f, "absent"),
        }
    }
}
