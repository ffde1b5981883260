//! Descriptor builders
//!
//! The registration surface for user types. Invalid registrations (both
//! class-level presence directives, duplicate keys or discriminators, a
//! non-`String` origin member, directives before any field) are programmer
//! errors and panic at descriptor build, the first use of the type.

use super::{
    downcast_slot, BoxAny, EnumShape, FieldDescriptor, FromDocOp, PostDocOp, Shape, StructShape,
    TypeDescriptor, UnionCase, UnionShape,
};
use crate::error::ReifyResult;
use crate::multicase::MultiCaseMap;
use crate::options::Presence;
use crate::reader::Reifier;
use std::any::{self, Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;
use vellum_doc::{DocNode, Origin};

impl FromDocOp {
    pub(crate) fn erase<T, F>(hook: F) -> FromDocOp
    where
        T: 'static,
        F: Fn(Option<&T>, &DocNode) -> ReifyResult<T> + Send + Sync + 'static,
    {
        let hook = Arc::new(hook);
        let update_hook = Arc::clone(&hook);
        FromDocOp {
            update: Box::new(move |slot: &mut dyn Any, node: &DocNode| {
                let slot = downcast_slot::<T>(slot);
                *slot = update_hook(Some(&*slot), node)?;
                Ok(())
            }),
            construct: Box::new(move |node: &DocNode| Ok(Box::new(hook(None, node)?) as BoxAny)),
        }
    }
}

pub(crate) fn erase_post_doc<T, F>(hook: F) -> PostDocOp
where
    T: 'static,
    F: Fn(&mut T) -> ReifyResult<()> + Send + Sync + 'static,
{
    Box::new(move |slot: &mut dyn Any| hook(downcast_slot::<T>(slot)))
}

/// Builds the descriptor of a struct type, member by member.
///
/// Directive methods ([`key`](StructBuilder::key),
/// [`mandatory`](StructBuilder::mandatory), ...) apply to the most recently
/// added member. Members that should be ignored by reification are simply
/// not registered; callback-typed members cannot be registered at all.
pub struct StructBuilder<T> {
    fields: Vec<FieldDescriptor>,
    class_mandatory: bool,
    class_allow_missing: bool,
    from_doc: Option<FromDocOp>,
    post_doc: Option<PostDocOp>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Default + 'static> StructBuilder<T> {
    /// Start a builder for `T`. Reification default-constructs instances,
    /// so `T` must implement `Default`.
    pub fn new() -> Self {
        StructBuilder {
            fields: Vec::new(),
            class_mandatory: false,
            class_allow_missing: false,
            from_doc: None,
            post_doc: None,
            _marker: PhantomData,
        }
    }

    /// Register a member under its declared name.
    pub fn field<F: super::Reflected>(mut self, name: &'static str, accessor: fn(&mut T) -> &mut F) -> Self {
        if self.fields.iter().any(|field| field.name == name) {
            panic!("member {name} registered twice on {}", any::type_name::<T>());
        }
        self.fields.push(FieldDescriptor {
            name,
            key: name,
            presence: None,
            inline: false,
            origin: false,
            field_type_id: TypeId::of::<F>(),
            update: Box::new(move |obj: &mut dyn Any, reifier: &Reifier, node, opts| {
                reifier.update_slot(accessor(downcast_slot::<T>(obj)), node, opts)
            }),
            update_inline: Box::new(move |obj: &mut dyn Any, reifier: &Reifier, node, opts, acc| {
                reifier.update_slot_shared(accessor(downcast_slot::<T>(obj)), node, opts, acc)
            }),
            write_origin: Box::new(move |obj: &mut dyn Any, origin: &Origin| {
                let field: &mut dyn Any = accessor(downcast_slot::<T>(obj));
                match field.downcast_mut::<String>() {
                    Some(slot) => *slot = origin.to_string(),
                    None => unreachable!("origin directive is only accepted for String members"),
                }
            }),
        });
        self
    }

    fn last_field(&mut self, directive: &str) -> &mut FieldDescriptor {
        match self.fields.last_mut() {
            Some(field) => field,
            None => panic!(
                "{directive} directive used before any member was registered on {}",
                any::type_name::<T>()
            ),
        }
    }

    /// Read the last member from this document key instead of its name.
    pub fn key(mut self, key: &'static str) -> Self {
        self.last_field("key").key = key;
        self
    }

    /// The last member must be present, regardless of other settings.
    pub fn mandatory(mut self) -> Self {
        self.last_field("mandatory").presence = Some(Presence::Mandatory);
        self
    }

    /// The last member may be absent, regardless of other settings.
    pub fn allow_missing(mut self) -> Self {
        self.last_field("allow_missing").presence = Some(Presence::AllowMissing);
        self
    }

    /// Hoist the last member's own members into this type's key set.
    pub fn inline(mut self) -> Self {
        self.last_field("inline").inline = true;
        self
    }

    /// Auto-populate the last member with the node's origin tag. The member
    /// must be a `String`, and a type can have at most one origin member.
    pub fn origin(mut self) -> Self {
        if self.fields.iter().any(|field| field.origin) {
            panic!("{} declares more than one origin member", any::type_name::<T>());
        }
        let field = self.last_field("origin");
        if field.field_type_id != TypeId::of::<String>() {
            panic!(
                "origin member {} on {} must be a String",
                field.name,
                any::type_name::<T>()
            );
        }
        field.origin = true;
        self
    }

    /// Every member without its own directive must be present.
    pub fn all_mandatory(mut self) -> Self {
        self.class_mandatory = true;
        self
    }

    /// Every member without its own directive may be absent.
    pub fn all_allow_missing(mut self) -> Self {
        self.class_allow_missing = true;
        self
    }

    /// Replace default reification of this type with `hook`.
    ///
    /// The hook sees the existing value (when updating) and the node, and
    /// returns the replacement value.
    pub fn from_doc<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&T>, &DocNode) -> ReifyResult<T> + Send + Sync + 'static,
    {
        self.from_doc = Some(FromDocOp::erase(hook));
        self
    }

    /// Run `hook` on every instance after it has been populated.
    pub fn post_doc<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) -> ReifyResult<()> + Send + Sync + 'static,
    {
        self.post_doc = Some(erase_post_doc(hook));
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        if self.class_mandatory && self.class_allow_missing {
            panic!(
                "{} declares both all_mandatory and all_allow_missing",
                any::type_name::<T>()
            );
        }
        for (index, field) in self.fields.iter().enumerate() {
            if self.fields[..index].iter().any(|other| other.key == field.key) {
                panic!("key {:?} used by two members of {}", field.key, any::type_name::<T>());
            }
        }

        let class_presence = if self.class_mandatory {
            Some(Presence::Mandatory)
        } else if self.class_allow_missing {
            Some(Presence::AllowMissing)
        } else {
            None
        };

        let mut descriptor = TypeDescriptor::new::<T>(Shape::Struct(StructShape {
            fields: self.fields,
            class_presence,
            default_construct: Box::new(|| Box::new(T::default()) as BoxAny),
        }));
        descriptor.from_doc = self.from_doc;
        descriptor.post_doc = self.post_doc;
        descriptor
    }
}

impl<T: Default + 'static> Default for StructBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the descriptor of a plain symbolic enum.
pub struct EnumBuilder<T> {
    symbols: Vec<&'static str>,
    values: Vec<T>,
}

impl<T: Clone + Send + Sync + 'static> EnumBuilder<T> {
    /// Start a builder for `T`.
    pub fn new() -> Self {
        EnumBuilder { symbols: Vec::new(), values: Vec::new() }
    }

    /// Register a symbol. Document scalars match symbol names without
    /// regard to case.
    pub fn symbol(mut self, name: &'static str, value: T) -> Self {
        if self.symbols.iter().any(|symbol| symbol.eq_ignore_ascii_case(name)) {
            panic!("symbol {name} registered twice on {}", any::type_name::<T>());
        }
        self.symbols.push(name);
        self.values.push(value);
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        let store_values = Arc::new(self.values);
        let construct_values = Arc::clone(&store_values);
        TypeDescriptor::new::<T>(Shape::Enum(EnumShape {
            symbols: self.symbols,
            store: Box::new(move |slot: &mut dyn Any, index| {
                *downcast_slot::<T>(slot) = store_values[index].clone();
            }),
            construct: Box::new(move |index| Box::new(construct_values[index].clone()) as BoxAny),
        }))
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EnumBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the descriptor of a polymorphic union: a base enum whose cases
/// are selected by a discriminator key in the document.
pub struct UnionBuilder<B> {
    cases: MultiCaseMap<UnionCase>,
    from_doc: Option<FromDocOp>,
    post_doc: Option<PostDocOp>,
    _marker: PhantomData<fn() -> B>,
}

impl<B: 'static> UnionBuilder<B> {
    /// Start a builder for base type `B`.
    pub fn new() -> Self {
        UnionBuilder {
            cases: MultiCaseMap::new(),
            from_doc: None,
            post_doc: None,
            _marker: PhantomData,
        }
    }

    /// Register a case: documents containing `key` reify a `P` from that
    /// key's value and wrap it with `wrap`. A bare scalar `key` selects the
    /// case with a default-constructed payload.
    pub fn case<P>(self, key: &str, wrap: fn(P) -> B) -> Self
    where
        P: super::Reflected + Default,
    {
        self.register_case::<P>(key, wrap, false)
    }

    /// Register a case whose payload members live in the same document as
    /// the discriminator key. Selected only when `key` is the document's
    /// first key.
    pub fn case_inline<P>(self, key: &str, wrap: fn(P) -> B) -> Self
    where
        P: super::Reflected + Default,
    {
        self.register_case::<P>(key, wrap, true)
    }

    fn register_case<P>(mut self, key: &str, wrap: fn(P) -> B, inline: bool) -> Self
    where
        P: super::Reflected + Default,
    {
        let case = UnionCase {
            inline,
            payload_descriptor: Box::new(|reifier: &Reifier| reifier.descriptor_of::<P>()),
            construct: Box::new(move |reifier: &Reifier, node, opts, accounting| {
                let payload: P = match accounting {
                    Some(accounting) => reifier.construct_shared::<P>(node, opts, accounting)?,
                    None => reifier.construct_slot::<P>(node, opts)?,
                };
                Ok(Box::new(wrap(payload)) as BoxAny)
            }),
            construct_default: Box::new(move || Box::new(wrap(P::default())) as BoxAny),
        };
        if !self.cases.insert(key, case) {
            panic!("discriminator {key:?} registered twice on union {}", any::type_name::<B>());
        }
        self
    }

    /// Replace default reification of the union with `hook`.
    pub fn from_doc<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&B>, &DocNode) -> ReifyResult<B> + Send + Sync + 'static,
    {
        self.from_doc = Some(FromDocOp::erase(hook));
        self
    }

    /// Run `hook` on every instance after it has been populated.
    pub fn post_doc<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut B) -> ReifyResult<()> + Send + Sync + 'static,
    {
        self.post_doc = Some(erase_post_doc(hook));
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        if self.cases.len() == 0 {
            panic!("union {} has no registered cases", any::type_name::<B>());
        }
        let mut descriptor = TypeDescriptor::new::<B>(Shape::Union(UnionShape {
            cases: self.cases,
            store: Box::new(|slot: &mut dyn Any, value: BoxAny| {
                *downcast_slot::<B>(slot) = *value
                    .downcast::<B>()
                    .ok()
                    .expect("union value type does not match its descriptor");
            }),
        }));
        descriptor.from_doc = self.from_doc;
        descriptor.post_doc = self.post_doc;
        descriptor
    }
}

impl<B: 'static> Default for UnionBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}
