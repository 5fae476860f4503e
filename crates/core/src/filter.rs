//! Validity filter: decides which nodes and nested children are imported.
//!
//! A node or child is rejected when ANY predicate matches: the base
//! predicates below always apply, and each [`NodeKind`] may add its own.

use crate::document::RawNode;
use crate::node_kind::NodeKind;
use crate::status::IMPORTABLE_STATUS;

/// Child element names that are never imported.
pub const EXCLUDED_CHILD_NAMES: &[&str] = &["comment"];

/// Placeholder value WordPress writes for metadata it could not export.
pub const UNKNOWN_META_VALUE: &str = "{{unknown}}";

/// Whether a top-level node should be imported at all.
pub fn is_node_valid(kind: NodeKind, node: &RawNode) -> bool {
    let base_rejects = kind.record_type().is_some() && !is_published(node);
    !(base_rejects || kind.rejects_node(node))
}

/// Whether a nested child of `node` survives into further processing.
pub fn is_child_valid(kind: NodeKind, _node: &RawNode, child: &RawNode) -> bool {
    let base_rejects = EXCLUDED_CHILD_NAMES.contains(&child.name.as_str())
        || (is_meta_child(child) && child.field("meta_value") == Some(UNKNOWN_META_VALUE));
    !(base_rejects || kind.rejects_child(child))
}

/// The nested children of `node` that pass [`is_child_valid`], in order.
pub fn filter_children(kind: NodeKind, node: &RawNode) -> Vec<&RawNode> {
    node.children
        .iter()
        .filter(|child| is_child_valid(kind, node, child))
        .collect()
}

fn is_published(node: &RawNode) -> bool {
    node.field("status") == Some(IMPORTABLE_STATUS)
}

fn is_meta_child(child: &RawNode) -> bool {
    child.name == "postmeta"
}
