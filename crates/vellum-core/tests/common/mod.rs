//! Document-building helpers shared by the integration suites.
#![allow(dead_code)]

use vellum_core::{DocNode, Origin};

pub const TEST_FILE: &str = "test.yaml:1";

pub fn origin() -> Origin {
    Origin::new(TEST_FILE)
}

pub fn scalar(text: &str) -> DocNode {
    DocNode::scalar(text, origin())
}

pub fn list<const N: usize>(items: [DocNode; N]) -> DocNode {
    DocNode::list_of(items, origin())
}

pub fn scalars<const N: usize>(items: [&str; N]) -> DocNode {
    DocNode::list_of(items.map(scalar), origin())
}

pub fn dict<const N: usize>(pairs: [(&str, DocNode); N]) -> DocNode {
    let mut node = DocNode::dictionary(origin());
    for (key, value) in pairs {
        node.insert(key, value).unwrap();
    }
    node
}
