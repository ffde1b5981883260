//! Document tree model for the Vellum reification engine
//!
//! This crate provides the parsed-document representation consumed by the
//! reifier:
//! - Tagged document nodes (dictionary / list / scalar / absent)
//! - Origin tags for human-readable diagnostics
//! - Variant-guarded accessors with typed access errors
//! - Document composition (deep merge, multi-document combination)
//!
//! Nodes are produced by an external parser or assembled programmatically;
//! this crate performs no I/O and knows nothing about any markup syntax.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod compose;
pub mod error;
pub mod node;
pub mod origin;

pub use compose::{combine_dicts, combine_lists, deep_merge};
pub use error::DocError;
pub use node::{DocNode, NodeKind};
pub use origin::Origin;

/// Document operation result
pub type DocResult<T> = Result<T, DocError>;
