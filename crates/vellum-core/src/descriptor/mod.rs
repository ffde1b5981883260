//! Type descriptors and the descriptor cache
//!
//! The replacement for runtime type introspection: every reifiable type
//! provides, through [`Reflected::build_descriptor`], a [`TypeDescriptor`]
//! whose `Shape` is a closed classification computed once (scalar, enum,
//! optional, container, struct, union) with monomorphized operations
//! erased behind `dyn Any`. The [`DescriptorCache`] memoizes descriptors by
//! `TypeId` for the engine's lifetime; entries are written once and never
//! mutated, so concurrent reads after population need no coordination.

pub(crate) mod builder;
mod cache;

pub use builder::{EnumBuilder, StructBuilder, UnionBuilder};
pub(crate) use cache::DescriptorCache;

use crate::error::ReifyResult;
use crate::multicase::MultiCaseMap;
use crate::options::{Presence, ReifyOptions};
use crate::reader::{Accounting, Reifier};
use std::any::{self, Any, TypeId};
use std::sync::Arc;
use vellum_doc::{DocNode, Origin};

pub(crate) type BoxAny = Box<dyn Any>;

/// A type that can be reified from document nodes.
///
/// Primitives, `String`, `char`, `Option<T>`, `Vec<T>`, `HashMap<K, V>`,
/// `HashSet<T>`, [`crate::MultiArray`] and `DocNode` itself are covered by
/// blanket implementations. Structs, enums and unions implement this trait
/// through [`StructBuilder`] / [`EnumBuilder`] / [`UnionBuilder`], usually
/// via the [`reflect_struct!`](crate::reflect_struct),
/// [`reflect_enum!`](crate::reflect_enum) and
/// [`reflect_union!`](crate::reflect_union) macros.
pub trait Reflected: Sized + 'static {
    /// Build this type's descriptor. Called once per engine; the result is
    /// cached and treated as read-only.
    fn build_descriptor() -> TypeDescriptor;
}

/// Cached reification metadata for one type.
pub struct TypeDescriptor {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) shape: Shape,
    pub(crate) from_doc: Option<FromDocOp>,
    pub(crate) post_doc: Option<PostDocOp>,
}

impl TypeDescriptor {
    pub(crate) fn new<T: 'static>(shape: Shape) -> Self {
        TypeDescriptor {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            shape,
            from_doc: None,
            post_doc: None,
        }
    }

    /// Name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Full reification override for a type: update and construct renderings of
/// the same user hook.
pub(crate) struct FromDocOp {
    pub(crate) update: Box<dyn Fn(&mut dyn Any, &DocNode) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct: Box<dyn Fn(&DocNode) -> ReifyResult<BoxAny> + Send + Sync>,
}

/// Post-process transform applied after default or custom reification.
pub(crate) type PostDocOp = Box<dyn Fn(&mut dyn Any) -> ReifyResult<()> + Send + Sync>;

/// Closed shape classification, computed once at descriptor-build time.
pub(crate) enum Shape {
    Scalar(ScalarShape),
    Enum(EnumShape),
    Optional(OptionalShape),
    Document(DocumentShape),
    List(ListShape),
    Array(ArrayShape),
    Map(MapShape),
    Set(SetShape),
    Struct(StructShape),
    Union(UnionShape),
}

pub(crate) struct ScalarShape {
    pub(crate) store: Box<dyn Fn(&mut dyn Any, &str, &DocNode) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct: Box<dyn Fn(&str, &DocNode) -> ReifyResult<BoxAny> + Send + Sync>,
}

pub(crate) struct EnumShape {
    pub(crate) symbols: Vec<&'static str>,
    pub(crate) store: Box<dyn Fn(&mut dyn Any, usize) + Send + Sync>,
    pub(crate) construct: Box<dyn Fn(usize) -> BoxAny + Send + Sync>,
}

pub(crate) struct OptionalShape {
    pub(crate) clear: Box<dyn Fn(&mut dyn Any) + Send + Sync>,
    pub(crate) update:
        Box<dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct_none: Box<dyn Fn() -> BoxAny + Send + Sync>,
    pub(crate) construct_some:
        Box<dyn Fn(&Reifier, &DocNode, &ReifyOptions) -> ReifyResult<BoxAny> + Send + Sync>,
}

pub(crate) struct DocumentShape {
    pub(crate) store: Box<dyn Fn(&mut dyn Any, &DocNode) + Send + Sync>,
    pub(crate) construct: Box<dyn Fn(&DocNode) -> BoxAny + Send + Sync>,
}

pub(crate) struct ListShape {
    pub(crate) len: Box<dyn Fn(&dyn Any) -> usize + Send + Sync>,
    pub(crate) truncate: Box<dyn Fn(&mut dyn Any, usize) + Send + Sync>,
    pub(crate) update_elem: Box<
        dyn Fn(&mut dyn Any, usize, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()>
            + Send
            + Sync,
    >,
    pub(crate) push_elem:
        Box<dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct_empty: Box<dyn Fn() -> BoxAny + Send + Sync>,
}

pub(crate) struct ArrayShape {
    pub(crate) sync:
        Box<dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct:
        Box<dyn Fn(&Reifier, &DocNode, &ReifyOptions) -> ReifyResult<BoxAny> + Send + Sync>,
}

pub(crate) struct MapShape {
    pub(crate) sync:
        Box<dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct_empty: Box<dyn Fn() -> BoxAny + Send + Sync>,
}

pub(crate) struct SetShape {
    pub(crate) rebuild:
        Box<dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()> + Send + Sync>,
    pub(crate) construct_empty: Box<dyn Fn() -> BoxAny + Send + Sync>,
}

pub(crate) struct StructShape {
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) class_presence: Option<Presence>,
    pub(crate) default_construct: Box<dyn Fn() -> BoxAny + Send + Sync>,
}

impl StructShape {
    /// Members required by directive alone, independent of options.
    /// Drives the union body-less-case check.
    pub(crate) fn directive_mandatory_members(&self) -> Vec<String> {
        let lenient = ReifyOptions::lenient();
        self.fields
            .iter()
            .filter(|field| {
                !field.origin
                    && crate::options::member_required(field.presence, self.class_presence, &lenient)
            })
            .map(|field| field.key.to_owned())
            .collect()
    }
}

pub(crate) struct FieldDescriptor {
    pub(crate) name: &'static str,
    /// Effective document key: the rename override, or the member name.
    pub(crate) key: &'static str,
    pub(crate) presence: Option<Presence>,
    pub(crate) inline: bool,
    /// Auto-populated from the node's origin tag instead of a document key.
    pub(crate) origin: bool,
    pub(crate) field_type_id: TypeId,
    /// Recurse into the member from its own value node.
    pub(crate) update:
        Box<dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions) -> ReifyResult<()> + Send + Sync>,
    /// Recurse into the member from the parent's node, sharing key accounting.
    pub(crate) update_inline: Box<
        dyn Fn(&mut dyn Any, &Reifier, &DocNode, &ReifyOptions, &mut Accounting) -> ReifyResult<()>
            + Send
            + Sync,
    >,
    /// Write an origin tag into the member. Only invoked when `origin` is
    /// set, which the builder only allows for `String` members.
    pub(crate) write_origin: Box<dyn Fn(&mut dyn Any, &Origin) + Send + Sync>,
}

pub(crate) struct UnionShape {
    pub(crate) cases: MultiCaseMap<UnionCase>,
    /// Overwrite a base-typed slot with a constructed base value.
    pub(crate) store: Box<dyn Fn(&mut dyn Any, BoxAny) + Send + Sync>,
}

pub(crate) struct UnionCase {
    /// Read the case from the same node as the base, first-key only.
    pub(crate) inline: bool,
    pub(crate) payload_descriptor: Box<dyn Fn(&Reifier) -> Arc<TypeDescriptor> + Send + Sync>,
    /// Reify the payload from `node` and wrap it into the base type.
    /// `accounting` selects the inline path (shared key accounting, no
    /// per-node verification).
    pub(crate) construct: Box<
        dyn Fn(&Reifier, &DocNode, &ReifyOptions, Option<&mut Accounting>) -> ReifyResult<BoxAny>
            + Send
            + Sync,
    >,
    /// Default-construct the payload and wrap it (body-less scalar form).
    pub(crate) construct_default: Box<dyn Fn() -> BoxAny + Send + Sync>,
}

/// Downcast an erased slot to its concrete type.
///
/// Slots are always paired with the descriptor built for their type, so a
/// mismatch is an engine bug, not a document error.
pub(crate) fn downcast_slot<T: 'static>(slot: &mut dyn Any) -> &mut T {
    slot.downcast_mut::<T>()
        .expect("slot type does not match its descriptor")
}
