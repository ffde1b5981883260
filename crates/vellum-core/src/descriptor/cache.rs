//! Descriptor memoization

use super::{Reflected, TypeDescriptor};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::TypeId;
use std::sync::Arc;

/// Process-lifetime cache of type descriptors, keyed by `TypeId`.
///
/// Descriptors are built on first encounter, outside the lock, and never
/// evicted or mutated afterwards; concurrent readers share the entries.
pub(crate) struct DescriptorCache {
    descriptors: RwLock<FxHashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    pub(crate) fn new() -> Self {
        DescriptorCache { descriptors: RwLock::new(FxHashMap::default()) }
    }

    pub(crate) fn descriptor_for<T: Reflected>(&self) -> Arc<TypeDescriptor> {
        let type_id = TypeId::of::<T>();
        if let Some(descriptor) = self.descriptors.read().get(&type_id) {
            return Arc::clone(descriptor);
        }

        log::debug!("building type descriptor for {}", std::any::type_name::<T>());
        let built = T::build_descriptor();
        assert_eq!(
            built.type_id,
            type_id,
            "build_descriptor for {} returned a descriptor for {}",
            std::any::type_name::<T>(),
            built.type_name
        );

        let mut descriptors = self.descriptors.write();
        Arc::clone(descriptors.entry(type_id).or_insert_with(|| Arc::new(built)))
    }
}
