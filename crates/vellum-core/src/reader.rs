//! The value reader
//!
//! [`Reifier`] owns the descriptor cache, the hook registry and the default
//! options, and drives the recursive read algorithm: given a target type, a
//! document node and (for updates) an existing value, it produces an
//! updated or newly-constructed value. Dispatch is a closed match over the
//! type's cached shape, evaluated in a fixed order: scalars and enums,
//! optionals, registered hooks, document passthrough, containers,
//! type-local overrides, then generic struct and union handling.
//!
//! Updates are identity-preserving per container kind (list prefixes and
//! map values mutate in place, unchanged array cells carry over), which is
//! what lets a host re-apply a changed document to a live object graph
//! (hotloading) without invalidating references held elsewhere.

use crate::descriptor::{
    BoxAny, DescriptorCache, EnumShape, Reflected, Shape, StructShape, TypeDescriptor, UnionShape,
};
use crate::error::{ReifyError, ReifyResult};
use crate::hooks::HookRegistry;
use crate::options::{member_required, ReifyOptions};
use rustc_hash::FxHashSet;
use std::any::Any;
use std::sync::Arc;
use vellum_doc::DocNode;

/// Per-walk bookkeeping: which document keys have been consumed, and
/// whether the enclosing verified boundary should check for leftovers.
pub(crate) struct Accounting {
    pub(crate) verify_extras: bool,
    pub(crate) consumed: FxHashSet<String>,
}

impl Accounting {
    fn new() -> Self {
        Accounting { verify_extras: false, consumed: FxHashSet::default() }
    }
}

fn canonical_key(key: &str, ignore_case: bool) -> String {
    if ignore_case {
        key.to_ascii_lowercase()
    } else {
        key.to_owned()
    }
}

fn is_null_scalar(node: &DocNode) -> bool {
    matches!(node.as_scalar(), Ok(text) if text == "null")
}

fn match_symbol(shape: &EnumShape, type_name: &'static str, node: &DocNode) -> ReifyResult<usize> {
    let text = node.as_scalar()?;
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        if let Some(index) = shape
            .symbols
            .iter()
            .position(|symbol| symbol.eq_ignore_ascii_case(trimmed))
        {
            return Ok(index);
        }
    }
    Err(ReifyError::conversion_to(type_name, text, node))
}

/// The reification engine.
///
/// Owns all shared state (descriptor cache, hook registry, default
/// options), so independent engines, say one per test, never contaminate
/// each other. Register hooks before reifying; reads are then safe from
/// multiple threads.
pub struct Reifier {
    descriptors: DescriptorCache,
    hooks: HookRegistry,
    defaults: ReifyOptions,
}

impl Reifier {
    /// Engine with default options.
    pub fn new() -> Self {
        Self::with_defaults(ReifyOptions::default())
    }

    /// Engine with the given default options.
    pub fn with_defaults(defaults: ReifyOptions) -> Self {
        Reifier {
            descriptors: DescriptorCache::new(),
            hooks: HookRegistry::new(),
            defaults,
        }
    }

    /// Options used when a call passes none.
    pub fn defaults(&self) -> ReifyOptions {
        self.defaults
    }

    /// Replace the default options.
    pub fn set_defaults(&mut self, defaults: ReifyOptions) {
        self.defaults = defaults;
    }

    /// Override reification of `T` with `hook`, consulted before generic
    /// structural handling. The hook sees the existing value (when
    /// updating) and the node, and returns the replacement value.
    pub fn register_from_doc<T, F>(&mut self, hook: F)
    where
        T: Reflected,
        F: Fn(Option<&T>, &DocNode) -> ReifyResult<T> + Send + Sync + 'static,
    {
        self.hooks.register_from_doc::<T, F>(hook);
    }

    /// Run `hook` on every reified `T` after default or custom population.
    /// A post-doc declared on the type itself takes precedence.
    pub fn register_post_doc<T, F>(&mut self, hook: F)
    where
        T: Reflected,
        F: Fn(&mut T) -> ReifyResult<()> + Send + Sync + 'static,
    {
        self.hooks.register_post_doc::<T, F>(hook);
    }

    /// Construct a fresh `T` from the document.
    pub fn reify<T: Reflected>(&self, node: &DocNode) -> ReifyResult<T> {
        self.reify_with(node, self.defaults)
    }

    /// Construct a fresh `T` from the document with explicit options.
    pub fn reify_with<T: Reflected>(&self, node: &DocNode, options: ReifyOptions) -> ReifyResult<T> {
        self.construct_slot::<T>(node, &options)
    }

    /// Update a live value in place from the document, preserving the
    /// identity of unchanged sub-objects. This is the hotload entry point.
    pub fn update<T: Reflected>(&self, value: &mut T, node: &DocNode) -> ReifyResult<()> {
        self.update_with(value, node, self.defaults)
    }

    /// Update a live value in place with explicit options.
    pub fn update_with<T: Reflected>(
        &self,
        value: &mut T,
        node: &DocNode,
        options: ReifyOptions,
    ) -> ReifyResult<()> {
        self.update_slot(value, node, &options)
    }

    /// Set a single member of `value` from the matching key of a dictionary
    /// node. Returns whether the type has such a member. Mostly useful as a
    /// helper when writing from-doc hooks.
    pub fn set_field_on<T: Reflected>(
        &self,
        value: &mut T,
        member: &str,
        node: &DocNode,
        options: Option<ReifyOptions>,
    ) -> ReifyResult<bool> {
        let options = options.unwrap_or(self.defaults);
        let ignore_case = !options.case_sensitive;
        let descriptor = self.descriptor_of::<T>();

        let Shape::Struct(shape) = &descriptor.shape else {
            return Err(ReifyError::structural(
                format!("type {} has no members to set", descriptor.type_name),
                node,
            ));
        };

        let value_node = node.try_get_key(member, ignore_case)?;
        for field in &shape.fields {
            let name_matches = if ignore_case {
                field.name.eq_ignore_ascii_case(member) || field.key.eq_ignore_ascii_case(member)
            } else {
                field.name == member || field.key == member
            };
            if !name_matches {
                continue;
            }

            if field.origin {
                (field.write_origin)(value as &mut dyn Any, node.origin());
                return Ok(true);
            }

            let Some(value_node) = value_node else {
                if member_required(field.presence, shape.class_presence, &options) {
                    return Err(ReifyError::MissingFields {
                        type_name: descriptor.type_name,
                        fields: vec![member.to_owned()],
                        origin: node.origin().clone(),
                    });
                }
                return Ok(false);
            };

            (field.update)(value as &mut dyn Any, self, value_node, &options)?;
            return Ok(true);
        }

        if !options.allow_extra_fields {
            return Err(ReifyError::ExtraFields {
                type_name: descriptor.type_name,
                keys: vec![member.to_owned()],
                origin: node.origin().clone(),
            });
        }
        Ok(false)
    }

    /////////////////////////////////////////////////
    // Typed entry points for monomorphized descriptor operations.

    pub(crate) fn descriptor_of<T: Reflected>(&self) -> Arc<TypeDescriptor> {
        self.descriptors.descriptor_for::<T>()
    }

    /// Update a typed slot, verifying consumed keys at this boundary.
    pub(crate) fn update_slot<T: Reflected>(
        &self,
        slot: &mut T,
        node: &DocNode,
        options: &ReifyOptions,
    ) -> ReifyResult<()> {
        let descriptor = self.descriptor_of::<T>();
        let mut accounting = Accounting::new();
        self.update_erased(&descriptor, slot, node, options, &mut accounting)?;
        self.verify_consumed(&descriptor, node, &accounting, options)
    }

    /// Update a typed slot inside an enclosing walk, sharing its key
    /// accounting instead of verifying here (inline members).
    pub(crate) fn update_slot_shared<T: Reflected>(
        &self,
        slot: &mut T,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<()> {
        let descriptor = self.descriptor_of::<T>();
        self.update_erased(&descriptor, slot, node, options, accounting)
    }

    /// Construct a typed value, verifying consumed keys at this boundary.
    pub(crate) fn construct_slot<T: Reflected>(
        &self,
        node: &DocNode,
        options: &ReifyOptions,
    ) -> ReifyResult<T> {
        let descriptor = self.descriptor_of::<T>();
        let mut accounting = Accounting::new();
        let boxed = self.construct_erased(&descriptor, node, options, &mut accounting)?;
        self.verify_consumed(&descriptor, node, &accounting, options)?;
        Ok(*boxed
            .downcast::<T>()
            .ok()
            .expect("constructed value type does not match its descriptor"))
    }

    /// Construct a typed value inside an enclosing walk, sharing its key
    /// accounting (inline union cases).
    pub(crate) fn construct_shared<T: Reflected>(
        &self,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<T> {
        let descriptor = self.descriptor_of::<T>();
        let boxed = self.construct_erased(&descriptor, node, options, accounting)?;
        Ok(*boxed
            .downcast::<T>()
            .ok()
            .expect("constructed value type does not match its descriptor"))
    }

    /////////////////////////////////////////////////
    // Erased core.

    fn update_erased(
        &self,
        descriptor: &TypeDescriptor,
        slot: &mut dyn Any,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<()> {
        self.update_erased_inner(descriptor, slot, node, options, accounting)
            .map_err(|error| error.with_origin(node))
    }

    fn update_erased_inner(
        &self,
        descriptor: &TypeDescriptor,
        slot: &mut dyn Any,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<()> {
        match &descriptor.shape {
            Shape::Scalar(shape) => (shape.store)(slot, node.as_scalar()?, node),
            Shape::Enum(shape) => {
                let index = match_symbol(shape, descriptor.type_name, node)?;
                (shape.store)(slot, index);
                Ok(())
            }
            Shape::Optional(shape) => {
                if is_null_scalar(node) {
                    (shape.clear)(slot);
                    Ok(())
                } else {
                    (shape.update)(slot, self, node, options)
                }
            }
            _ => {
                if let Some(hook) = self.hooks.from_doc(descriptor.type_id) {
                    (hook.update)(slot, node)?;
                    return self.apply_post_doc(descriptor, slot);
                }
                if let Some(from_doc) = &descriptor.from_doc {
                    (from_doc.update)(slot, node)?;
                    return self.apply_post_doc(descriptor, slot);
                }
                match &descriptor.shape {
                    Shape::Document(shape) => {
                        (shape.store)(slot, node);
                        Ok(())
                    }
                    Shape::List(shape) => self.update_list(shape, slot, node, options),
                    Shape::Array(shape) => (shape.sync)(slot, self, node, options),
                    Shape::Map(shape) => (shape.sync)(slot, self, node, options),
                    Shape::Set(shape) => (shape.rebuild)(slot, self, node, options),
                    Shape::Struct(shape) => {
                        self.set_fields_erased(descriptor, shape, slot, node, options, accounting)?;
                        self.apply_post_doc(descriptor, slot)
                    }
                    Shape::Union(shape) => {
                        let value = self.read_union(descriptor, shape, node, options, accounting)?;
                        (shape.store)(slot, value);
                        self.apply_post_doc(descriptor, slot)
                    }
                    Shape::Scalar(_) | Shape::Enum(_) | Shape::Optional(_) => {
                        unreachable!("handled before the hook checks")
                    }
                }
            }
        }
    }

    fn construct_erased(
        &self,
        descriptor: &TypeDescriptor,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<BoxAny> {
        self.construct_erased_inner(descriptor, node, options, accounting)
            .map_err(|error| error.with_origin(node))
    }

    fn construct_erased_inner(
        &self,
        descriptor: &TypeDescriptor,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<BoxAny> {
        match &descriptor.shape {
            Shape::Scalar(shape) => (shape.construct)(node.as_scalar()?, node),
            Shape::Enum(shape) => {
                let index = match_symbol(shape, descriptor.type_name, node)?;
                Ok((shape.construct)(index))
            }
            Shape::Optional(shape) => {
                if is_null_scalar(node) {
                    Ok((shape.construct_none)())
                } else {
                    (shape.construct_some)(self, node, options)
                }
            }
            _ => {
                if let Some(hook) = self.hooks.from_doc(descriptor.type_id) {
                    let mut value = (hook.construct)(node)?;
                    self.apply_post_doc(descriptor, &mut *value)?;
                    return Ok(value);
                }
                if let Some(from_doc) = &descriptor.from_doc {
                    let mut value = (from_doc.construct)(node)?;
                    self.apply_post_doc(descriptor, &mut *value)?;
                    return Ok(value);
                }
                match &descriptor.shape {
                    Shape::Document(shape) => Ok((shape.construct)(node)),
                    Shape::List(shape) => {
                        let mut boxed = (shape.construct_empty)();
                        self.update_list(shape, &mut *boxed, node, options)?;
                        Ok(boxed)
                    }
                    Shape::Array(shape) => (shape.construct)(self, node, options),
                    Shape::Map(shape) => {
                        let mut boxed = (shape.construct_empty)();
                        (shape.sync)(&mut *boxed, self, node, options)?;
                        Ok(boxed)
                    }
                    Shape::Set(shape) => {
                        let mut boxed = (shape.construct_empty)();
                        (shape.rebuild)(&mut *boxed, self, node, options)?;
                        Ok(boxed)
                    }
                    Shape::Struct(shape) => {
                        let mut boxed = (shape.default_construct)();
                        self.set_fields_erased(descriptor, shape, &mut *boxed, node, options, accounting)?;
                        self.apply_post_doc(descriptor, &mut *boxed)?;
                        Ok(boxed)
                    }
                    Shape::Union(shape) => {
                        let mut value = self.read_union(descriptor, shape, node, options, accounting)?;
                        self.apply_post_doc(descriptor, &mut *value)?;
                        Ok(value)
                    }
                    Shape::Scalar(_) | Shape::Enum(_) | Shape::Optional(_) => {
                        unreachable!("handled before the hook checks")
                    }
                }
            }
        }
    }

    fn update_list(
        &self,
        shape: &crate::descriptor::ListShape,
        slot: &mut dyn Any,
        node: &DocNode,
        options: &ReifyOptions,
    ) -> ReifyResult<()> {
        let doc_len = node.values()?.len();
        let existing_len = (shape.len)(&*slot);

        // Surviving prefix updates in place; the tail is discarded or
        // constructed from scratch.
        if existing_len > doc_len {
            (shape.truncate)(slot, doc_len);
        }
        for index in 0..existing_len.min(doc_len) {
            (shape.update_elem)(slot, index, self, node.get(index)?, options)?;
        }
        for index in existing_len..doc_len {
            (shape.push_elem)(slot, self, node.get(index)?, options)?;
        }
        Ok(())
    }

    fn set_fields_erased(
        &self,
        descriptor: &TypeDescriptor,
        shape: &StructShape,
        object: &mut dyn Any,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<()> {
        accounting.verify_extras = true;

        if !node.is_dictionary() {
            // Single-member shorthand: a type with exactly one eligible
            // member can be written as that member's bare value.
            let mut eligible = shape.fields.iter().filter(|field| !field.origin);
            return match (eligible.next(), eligible.next()) {
                (Some(field), None) => {
                    // The recursive call verifies the node itself.
                    accounting.verify_extras = false;
                    (field.update)(object, self, node, options)
                }
                _ => {
                    let detail = match node.as_scalar() {
                        Ok(text) => format!(" ({text:?})"),
                        Err(_) => String::new(),
                    };
                    Err(ReifyError::structural(
                        format!(
                            "cannot reify a {} node{} into type {}: the shorthand needs exactly one eligible member",
                            node.kind(),
                            detail,
                            descriptor.type_name,
                        ),
                        node,
                    ))
                }
            };
        }

        let ignore_case = !options.case_sensitive;
        let mut missing: Vec<String> = Vec::new();

        for field in &shape.fields {
            if field.origin {
                (field.write_origin)(object, node.origin());
                continue;
            }
            if field.inline {
                (field.update_inline)(object, self, node, options, accounting)?;
                continue;
            }
            match node.try_get_key(field.key, ignore_case)? {
                Some(value_node) => {
                    (field.update)(object, self, value_node, options)?;
                    accounting.consumed.insert(canonical_key(field.key, ignore_case));
                }
                None => {
                    if member_required(field.presence, shape.class_presence, options) {
                        missing.push(field.key.to_owned());
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(ReifyError::MissingFields {
                type_name: descriptor.type_name,
                fields: missing,
                origin: node.origin().clone(),
            });
        }
        Ok(())
    }

    fn read_union(
        &self,
        descriptor: &TypeDescriptor,
        shape: &UnionShape,
        node: &DocNode,
        options: &ReifyOptions,
        accounting: &mut Accounting,
    ) -> ReifyResult<BoxAny> {
        let ignore_case = !options.case_sensitive;

        if node.is_scalar() {
            // A bare discriminator selects a case with no body.
            let text = node.as_scalar()?;
            let Some(case) = shape.cases.get(text.trim(), ignore_case) else {
                return Err(ReifyError::structural(
                    format!("{:?} is not a case of union type {}", text, descriptor.type_name),
                    node,
                ));
            };
            let payload = (case.payload_descriptor)(self);
            if let Shape::Struct(payload_shape) = &payload.shape {
                let mandatory = payload_shape.directive_mandatory_members();
                if !mandatory.is_empty() {
                    return Err(ReifyError::MissingFields {
                        type_name: payload.type_name,
                        fields: mandatory,
                        origin: node.origin().clone(),
                    });
                }
            }
            return Ok((case.construct_default)());
        }

        accounting.verify_extras = true;

        // The first document key naming a registered case wins. Inline
        // cases read the whole document and only match as the first key.
        for (position, (key, value_node)) in node.pairs()?.enumerate() {
            if let Some(case) = shape.cases.get(key, ignore_case) {
                if case.inline {
                    if position == 0 {
                        return (case.construct)(self, node, options, Some(accounting));
                    }
                } else {
                    accounting.consumed.insert(canonical_key(key, ignore_case));
                    return (case.construct)(self, value_node, options, None);
                }
            }
        }

        let actual: Vec<String> = node.pairs()?.map(|(key, _)| key.clone()).collect();
        let expected: Vec<&str> = shape.cases.keys().collect();
        Err(ReifyError::structural(
            format!(
                "no key of [{}] selects a case of union type {}; expected one of [{}]",
                actual.join(", "),
                descriptor.type_name,
                expected.join(", "),
            ),
            node,
        ))
    }

    fn apply_post_doc(&self, descriptor: &TypeDescriptor, slot: &mut dyn Any) -> ReifyResult<()> {
        if let Some(post_doc) = &descriptor.post_doc {
            post_doc(slot)
        } else if let Some(post_doc) = self.hooks.post_doc(descriptor.type_id) {
            post_doc(slot)
        } else {
            Ok(())
        }
    }

    fn verify_consumed(
        &self,
        descriptor: &TypeDescriptor,
        node: &DocNode,
        accounting: &Accounting,
        options: &ReifyOptions,
    ) -> ReifyResult<()> {
        if !accounting.verify_extras || options.allow_extra_fields || !node.is_dictionary() {
            return Ok(());
        }
        if accounting.consumed.len() == node.count()? {
            return Ok(());
        }

        let ignore_case = !options.case_sensitive;
        let extra: Vec<String> = node
            .pairs()?
            .filter(|(key, _)| !accounting.consumed.contains(&canonical_key(key, ignore_case)))
            .map(|(key, _)| key.clone())
            .collect();
        if extra.is_empty() {
            return Ok(());
        }
        Err(ReifyError::ExtraFields {
            type_name: descriptor.type_name,
            keys: extra,
            origin: node.origin().clone(),
        })
    }
}

impl Default for Reifier {
    fn default() -> Self {
        Self::new()
    }
}
