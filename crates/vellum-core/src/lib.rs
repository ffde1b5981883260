//! Vellum reification engine
//!
//! Maps parsed document trees onto statically-typed values, and re-applies
//! changed documents to live values without discarding the identity of
//! unchanged sub-objects (hotloading). This crate provides:
//! - The type descriptor cache (shape classification, member directives)
//! - The recursive value reader with identity-preserving container updates
//! - The custom hook registry (from-doc overrides, post-doc transforms)
//! - Registration builders and macros for structs, enums and unions
//!
//! The document model lives in `vellum-doc` and is re-exported here.
//! Parsing markup into documents and watching files for changes are the
//! host's business; the engine is synchronous, performs no I/O, and is
//! safe to share across threads once hooks are registered.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod builtin;
pub mod descriptor;
pub mod error;
mod hooks;
mod macros;
pub mod multi_array;
mod multicase;
pub mod options;
pub mod reader;
mod reflect;

pub use descriptor::{EnumBuilder, Reflected, StructBuilder, TypeDescriptor, UnionBuilder};
pub use error::{ReifyError, ReifyResult};
pub use multi_array::MultiArray;
pub use options::{member_required, Presence, ReifyOptions};
pub use reader::Reifier;

// Document model re-exports, so most hosts depend on this crate alone.
pub use vellum_doc::{
    combine_dicts, combine_lists, deep_merge, DocError, DocNode, NodeKind, Origin,
};
