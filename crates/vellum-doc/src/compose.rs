//! Document composition
//!
//! Combining several parsed documents into one synthetic document, and
//! deep-merging patch documents over base documents. All composed nodes
//! carry origin tags built from their sources.

use crate::error::DocError;
use crate::node::{DocNode, NodeKind};
use crate::origin::Origin;

/// Deep-merge two documents, favoring `rhs` in any unresolvable conflict.
///
/// Lists concatenate. Dictionaries merge key-wise: when both sides map a
/// key to values of the same kind the values are merged recursively,
/// otherwise the right-hand value wins. Scalars take the right-hand value.
/// Operands of different kinds (or absent operands) cannot be merged.
pub fn deep_merge(lhs: &DocNode, rhs: &DocNode) -> Result<DocNode, DocError> {
    if lhs.kind() != rhs.kind() || lhs.kind() == NodeKind::Absent {
        return Err(DocError::MergeKind {
            lhs: lhs.kind(),
            rhs: rhs.kind(),
            origin: lhs.origin().clone(),
        });
    }

    match lhs.kind() {
        NodeKind::Scalar => Ok(rhs.clone()),
        NodeKind::List => {
            let mut merged = DocNode::list(Origin::merged(lhs.origin(), rhs.origin()));
            for item in lhs.values()?.chain(rhs.values()?) {
                merged.push(item.clone())?;
            }
            Ok(merged)
        }
        NodeKind::Dictionary => {
            let mut merged = DocNode::dictionary(Origin::merged(lhs.origin(), rhs.origin()));
            for (key, value) in lhs.pairs()? {
                merged.insert(key.clone(), value.clone())?;
            }
            for (key, value) in rhs.pairs()? {
                let combined = match lhs.try_get_key(key, false)? {
                    Some(existing) if existing.kind() == value.kind() => {
                        deep_merge(existing, value)?
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), combined)?;
            }
            Ok(merged)
        }
        NodeKind::Absent => unreachable!("absent operands rejected above"),
    }
}

/// Combine several documents into a single list document.
///
/// Operands that are themselves lists are flattened into the result;
/// anything else is appended as a single element.
pub fn combine_lists(docs: &[DocNode]) -> DocNode {
    let origin = Origin::combined(docs.iter().map(|d| d.origin()));
    let mut result = DocNode::list(origin);
    for doc in docs {
        if doc.is_list() {
            for item in doc.values().expect("kind checked") {
                result.push(item.clone()).expect("result is a list");
            }
        } else {
            result.push(doc.clone()).expect("result is a list");
        }
    }
    result
}

/// Combine several dictionary documents into a single dictionary document.
///
/// Later documents overwrite earlier keys wholesale; use [`deep_merge`]
/// when recursive merging is wanted instead.
pub fn combine_dicts(docs: &[DocNode]) -> Result<DocNode, DocError> {
    let origin = Origin::combined(docs.iter().map(|d| d.origin()));
    let mut result = DocNode::dictionary(origin);
    for doc in docs {
        for (key, value) in doc.pairs()? {
            result.insert(key.clone(), value.clone())?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(tag: &str) -> Origin {
        Origin::new(tag)
    }

    fn scalar(text: &str) -> DocNode {
        DocNode::scalar(text, origin("test"))
    }

    fn dict(pairs: &[(&str, DocNode)]) -> DocNode {
        let mut node = DocNode::dictionary(origin("test"));
        for (key, value) in pairs {
            node.insert(*key, value.clone()).unwrap();
        }
        node
    }

    #[test]
    fn test_merge_scalars_takes_rhs() {
        let merged = deep_merge(&scalar("old"), &scalar("new")).unwrap();
        assert_eq!(merged.as_scalar().unwrap(), "new");
    }

    #[test]
    fn test_merge_lists_concatenates() {
        let lhs = DocNode::list_of([scalar("a"), scalar("b")], origin("lhs"));
        let rhs = DocNode::list_of([scalar("c")], origin("rhs"));
        let merged = deep_merge(&lhs, &rhs).unwrap();
        assert_eq!(merged.count().unwrap(), 3);
        assert_eq!(merged.get(2).unwrap().as_scalar().unwrap(), "c");
    }

    #[test]
    fn test_merge_dicts_recurses_on_same_kind() {
        let lhs = dict(&[
            ("keep", scalar("1")),
            ("nested", dict(&[("a", scalar("1")), ("b", scalar("2"))])),
        ]);
        let rhs = dict(&[("nested", dict(&[("b", scalar("3")), ("c", scalar("4"))]))]);
        let merged = deep_merge(&lhs, &rhs).unwrap();

        assert_eq!(merged.get_key("keep", false).unwrap().as_scalar().unwrap(), "1");
        let nested = merged.get_key("nested", false).unwrap();
        assert_eq!(nested.get_key("a", false).unwrap().as_scalar().unwrap(), "1");
        assert_eq!(nested.get_key("b", false).unwrap().as_scalar().unwrap(), "3");
        assert_eq!(nested.get_key("c", false).unwrap().as_scalar().unwrap(), "4");
    }

    #[test]
    fn test_merge_dict_kind_conflict_takes_rhs() {
        let lhs = dict(&[("value", dict(&[("a", scalar("1"))]))]);
        let rhs = dict(&[("value", scalar("flat"))]);
        let merged = deep_merge(&lhs, &rhs).unwrap();
        assert_eq!(merged.get_key("value", false).unwrap().as_scalar().unwrap(), "flat");
    }

    #[test]
    fn test_merge_mismatched_kinds_fails() {
        let err = deep_merge(&scalar("x"), &DocNode::list(origin("rhs"))).unwrap_err();
        assert!(matches!(
            err,
            DocError::MergeKind { lhs: NodeKind::Scalar, rhs: NodeKind::List, .. }
        ));
    }

    #[test]
    fn test_merge_absent_fails() {
        let absent = DocNode::absent(origin("x"));
        assert!(deep_merge(&absent, &absent).is_err());
    }

    #[test]
    fn test_merged_origin_names_both_sources() {
        let merged = deep_merge(
            &DocNode::list(origin("base.yaml")),
            &DocNode::list(origin("patch.yaml")),
        )
        .unwrap();
        assert_eq!(merged.origin().as_str(), "merging of: [base.yaml, patch.yaml]");
    }

    #[test]
    fn test_combine_lists_flattens_list_operands() {
        let docs = [
            DocNode::list_of([scalar("a"), scalar("b")], origin("one.yaml")),
            scalar("c"),
            DocNode::list_of([scalar("d")], origin("two.yaml")),
        ];
        let combined = combine_lists(&docs);
        assert_eq!(combined.count().unwrap(), 4);
        assert_eq!(combined.get(2).unwrap().as_scalar().unwrap(), "c");
        assert!(combined.origin().as_str().starts_with("combination of: ["));
    }

    #[test]
    fn test_combine_dicts_later_wins() {
        let docs = [
            dict(&[("a", scalar("1")), ("b", scalar("2"))]),
            dict(&[("b", scalar("override")), ("c", scalar("3"))]),
        ];
        let combined = combine_dicts(&docs).unwrap();
        assert_eq!(combined.count().unwrap(), 3);
        assert_eq!(combined.get_key("b", false).unwrap().as_scalar().unwrap(), "override");
    }

    #[test]
    fn test_combine_dicts_rejects_non_dict() {
        assert!(combine_dicts(&[scalar("x")]).is_err());
    }
}
