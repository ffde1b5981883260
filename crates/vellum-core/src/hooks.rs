//! Custom hook registry
//!
//! Process-wide (per-engine) tables mapping a target type to user-supplied
//! conversion functions: a full reification override consulted before
//! generic structural handling, and a post-process transform applied after
//! default or custom reification completes. Populated before any
//! reification call that needs it; lookups are read-only during
//! reification. There is no removal operation; hosts that need a clean
//! slate construct a fresh engine.

use crate::descriptor::builder::erase_post_doc;
use crate::descriptor::{FromDocOp, PostDocOp, Reflected};
use crate::error::ReifyResult;
use rustc_hash::FxHashMap;
use std::any::TypeId;
use vellum_doc::DocNode;

pub(crate) struct HookRegistry {
    from_doc: FxHashMap<TypeId, FromDocOp>,
    post_doc: FxHashMap<TypeId, PostDocOp>,
}

impl HookRegistry {
    pub(crate) fn new() -> Self {
        HookRegistry {
            from_doc: FxHashMap::default(),
            post_doc: FxHashMap::default(),
        }
    }

    pub(crate) fn register_from_doc<T, F>(&mut self, hook: F)
    where
        T: Reflected,
        F: Fn(Option<&T>, &DocNode) -> ReifyResult<T> + Send + Sync + 'static,
    {
        if self
            .from_doc
            .insert(TypeId::of::<T>(), FromDocOp::erase(hook))
            .is_some()
        {
            log::warn!("replacing registered from-doc hook for {}", std::any::type_name::<T>());
        }
    }

    pub(crate) fn register_post_doc<T, F>(&mut self, hook: F)
    where
        T: Reflected,
        F: Fn(&mut T) -> ReifyResult<()> + Send + Sync + 'static,
    {
        if self
            .post_doc
            .insert(TypeId::of::<T>(), erase_post_doc(hook))
            .is_some()
        {
            log::warn!("replacing registered post-doc hook for {}", std::any::type_name::<T>());
        }
    }

    pub(crate) fn from_doc(&self, type_id: TypeId) -> Option<&FromDocOp> {
        self.from_doc.get(&type_id)
    }

    pub(crate) fn post_doc(&self, type_id: TypeId) -> Option<&PostDocOp> {
        self.post_doc.get(&type_id)
    }
}
