//! Built-in `Reflected` implementations
//!
//! Scalars parse from the node's text with locale-invariant rules;
//! containers get the identity-preserving update strategies described on
//! [`crate::Reifier`]: lists update their shared prefix in place, maps are
//! three-way diffed, sets are rebuilt, rectangular arrays reshape with
//! carry-over.

use crate::descriptor::{
    downcast_slot, ArrayShape, BoxAny, DocumentShape, ListShape, MapShape, OptionalShape,
    Reflected, ScalarShape, SetShape, Shape, TypeDescriptor,
};
use crate::error::{ReifyError, ReifyResult};
use crate::multi_array::{flatten, MultiArray};
use crate::options::ReifyOptions;
use crate::reader::Reifier;
use rustc_hash::FxHashSet;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::str::FromStr;
use vellum_doc::DocNode;

fn parse_trimmed<T: FromStr + 'static>(text: &str, node: &DocNode) -> ReifyResult<T> {
    text.trim()
        .parse::<T>()
        .map_err(|_| ReifyError::conversion::<T>(text, node))
}

pub(crate) fn scalar_descriptor<T: 'static>(
    parse: fn(&str, &DocNode) -> ReifyResult<T>,
) -> TypeDescriptor {
    TypeDescriptor::new::<T>(Shape::Scalar(ScalarShape {
        store: Box::new(move |slot: &mut dyn Any, text: &str, node: &DocNode| {
            *downcast_slot::<T>(slot) = parse(text, node)?;
            Ok(())
        }),
        construct: Box::new(move |text: &str, node: &DocNode| {
            Ok(Box::new(parse(text, node)?) as BoxAny)
        }),
    }))
}

macro_rules! reflect_parseable {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflected for $ty {
            fn build_descriptor() -> TypeDescriptor {
                scalar_descriptor::<$ty>(parse_trimmed::<$ty>)
            }
        }
    )*};
}

reflect_parseable!(
    i8, u8, i16, u16, i32, u32, i64, u64, i128, u128, isize, usize, f32, f64, char,
);

impl Reflected for bool {
    fn build_descriptor() -> TypeDescriptor {
        scalar_descriptor::<bool>(|text, node| {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(ReifyError::conversion::<bool>(text, node))
            }
        })
    }
}

impl Reflected for String {
    fn build_descriptor() -> TypeDescriptor {
        scalar_descriptor::<String>(|text, _node| Ok(text.to_owned()))
    }
}

impl Reflected for DocNode {
    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<DocNode>(Shape::Document(DocumentShape {
            store: Box::new(|slot: &mut dyn Any, node: &DocNode| {
                *downcast_slot::<DocNode>(slot) = node.clone();
            }),
            construct: Box::new(|node: &DocNode| Box::new(node.clone()) as BoxAny),
        }))
    }
}

impl<T: Reflected> Reflected for Option<T> {
    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Option<T>>(Shape::Optional(OptionalShape {
            clear: Box::new(|slot: &mut dyn Any| {
                *downcast_slot::<Option<T>>(slot) = None;
            }),
            update: Box::new(|slot: &mut dyn Any, reifier: &Reifier, node, opts| {
                let slot = downcast_slot::<Option<T>>(slot);
                match slot {
                    Some(inner) => reifier.update_slot(inner, node, opts),
                    None => {
                        *slot = Some(reifier.construct_slot::<T>(node, opts)?);
                        Ok(())
                    }
                }
            }),
            construct_none: Box::new(|| Box::new(None::<T>) as BoxAny),
            construct_some: Box::new(|reifier: &Reifier, node, opts| {
                Ok(Box::new(Some(reifier.construct_slot::<T>(node, opts)?)) as BoxAny)
            }),
        }))
    }
}

impl<T: Reflected> Reflected for Vec<T> {
    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Vec<T>>(Shape::List(ListShape {
            len: Box::new(|slot: &dyn Any| {
                slot.downcast_ref::<Vec<T>>()
                    .expect("slot type does not match its descriptor")
                    .len()
            }),
            truncate: Box::new(|slot: &mut dyn Any, len: usize| {
                downcast_slot::<Vec<T>>(slot).truncate(len);
            }),
            update_elem: Box::new(|slot: &mut dyn Any, index, reifier: &Reifier, node, opts| {
                let items = downcast_slot::<Vec<T>>(slot);
                reifier.update_slot(&mut items[index], node, opts)
            }),
            push_elem: Box::new(|slot: &mut dyn Any, reifier: &Reifier, node, opts| {
                let value = reifier.construct_slot::<T>(node, opts)?;
                downcast_slot::<Vec<T>>(slot).push(value);
                Ok(())
            }),
            construct_empty: Box::new(|| Box::new(Vec::<T>::new()) as BoxAny),
        }))
    }
}

impl<K, V> Reflected for HashMap<K, V>
where
    K: Reflected + Eq + Hash + Clone,
    V: Reflected,
{
    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<HashMap<K, V>>(Shape::Map(MapShape {
            sync: Box::new(|slot: &mut dyn Any, reifier: &Reifier, node, opts| {
                let map = downcast_slot::<HashMap<K, V>>(slot);
                let mut seen: FxHashSet<K> = FxHashSet::default();

                for (key_text, value_node) in node.pairs()? {
                    // Keys go through the reader too, wrapped as a scalar.
                    let key_node = DocNode::scalar(key_text.clone(), node.origin().clone());
                    let key: K = reifier.construct_slot::<K>(&key_node, opts)?;
                    if map.contains_key(&key) {
                        let existing = map.get_mut(&key).expect("key checked above");
                        reifier.update_slot(existing, value_node, opts)?;
                    } else {
                        let value = reifier.construct_slot::<V>(value_node, opts)?;
                        map.insert(key.clone(), value);
                    }
                    seen.insert(key);
                }

                map.retain(|key, _| seen.contains(key));
                Ok(())
            }),
            construct_empty: Box::new(|| Box::new(HashMap::<K, V>::new()) as BoxAny),
        }))
    }
}

impl<T> Reflected for HashSet<T>
where
    T: Reflected + Eq + Hash,
{
    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<HashSet<T>>(Shape::Set(SetShape {
            rebuild: Box::new(|slot: &mut dyn Any, reifier: &Reifier, node, opts| {
                let set = downcast_slot::<HashSet<T>>(slot);
                set.clear();
                for item in node.values()? {
                    set.insert(reifier.construct_slot::<T>(item, opts)?);
                }
                Ok(())
            }),
            construct_empty: Box::new(|| Box::new(HashSet::<T>::new()) as BoxAny),
        }))
    }
}

impl<T: Reflected, const R: usize> Reflected for MultiArray<T, R> {
    fn build_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<MultiArray<T, R>>(Shape::Array(ArrayShape {
            sync: Box::new(|slot: &mut dyn Any, reifier: &Reifier, node, opts| {
                sync_multi_array(downcast_slot::<MultiArray<T, R>>(slot), reifier, node, opts)
            }),
            construct: Box::new(|reifier: &Reifier, node, opts| {
                let mut array = MultiArray::<T, R>::default();
                sync_multi_array(&mut array, reifier, node, opts)?;
                Ok(Box::new(array) as BoxAny)
            }),
        }))
    }
}

/// Derive the document's shape, carry over existing cells that remain in
/// bounds, then populate every cell from the document (existing cells are
/// updated in place).
fn sync_multi_array<T: Reflected, const R: usize>(
    array: &mut MultiArray<T, R>,
    reifier: &Reifier,
    node: &DocNode,
    opts: &ReifyOptions,
) -> ReifyResult<()> {
    // Dimension d's length is the list length d levels down.
    let mut dims = [0usize; R];
    let mut current = node;
    for (depth, dim) in dims.iter_mut().enumerate() {
        *dim = current.count()?;
        if *dim == 0 {
            break;
        }
        if depth + 1 < R {
            current = current.get(0)?;
        }
    }

    let mut cells = array.take_reshaped(dims);
    let mut index = [0usize; R];
    read_array_level(reifier, node, opts, &dims, 0, &mut index, &mut cells)?;

    let data: Vec<T> = cells
        .into_iter()
        .map(|cell| cell.expect("rectangular walk populates every cell"))
        .collect();
    *array = MultiArray::from_parts(dims, data);
    Ok(())
}

fn read_array_level<T: Reflected, const R: usize>(
    reifier: &Reifier,
    node: &DocNode,
    opts: &ReifyOptions,
    dims: &[usize; R],
    depth: usize,
    index: &mut [usize; R],
    cells: &mut [Option<T>],
) -> ReifyResult<()> {
    let count = node.count()?;
    if count != dims[depth] {
        return Err(ReifyError::structural(
            format!(
                "expected {} elements in dimension {} but found {}",
                dims[depth], depth, count
            ),
            node,
        ));
    }

    for i in 0..count {
        index[depth] = i;
        let child = node.get(i)?;
        if depth + 1 == R {
            let cell = &mut cells[flatten(dims, index)];
            match cell.take() {
                Some(mut existing) => {
                    reifier.update_slot(&mut existing, child, opts)?;
                    *cell = Some(existing);
                }
                None => *cell = Some(reifier.construct_slot::<T>(child, opts)?),
            }
        } else {
            read_array_level(reifier, child, opts, dims, depth + 1, index, cells)?;
        }
    }
    Ok(())
}
