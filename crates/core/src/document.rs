//! In-memory view of a WXR export document.
//!
//! The whole document is materialized up front: the importer searches nodes
//! it has already seen while resolving associations, so streaming is not an
//! option. Parsing is the only place a run can fail as a whole.

use std::collections::BTreeMap;

use crate::error::CoreError;

/// Channel children that are treated as importable nodes.
pub const NODE_ELEMENTS: &[&str] = &["item", "tag", "category", "author", "term"];

/// Namespace fragment that tells `excerpt:encoded` apart from `content:encoded`.
const EXCERPT_NAMESPACE_MARKER: &str = "/excerpt/";

/// One element of the export document.
///
/// Leaf children without attributes become `fields`; children carrying
/// attributes or nested elements (categories, postmeta, comments) are kept
/// as ordered `children`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNode {
    pub name: String,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
    pub fields: BTreeMap<String, String>,
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper for assembling nodes by hand.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Identifier used in logs and failure reports.
    pub fn source_id(&self) -> String {
        for key in ["id", "term_id", "author_id"] {
            if let Some(id) = self.field(key) {
                return format!("{}#{id}", self.name);
            }
        }
        match self.field("post_name").or_else(|| self.field("title")) {
            Some(label) if !label.is_empty() => format!("{}:{label}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Inline term reference carried on an item, e.g.
/// `<category domain="post_tag" nicename="foo">Foo</category>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedReference {
    pub domain: String,
    pub nicename: String,
    pub name: String,
}

impl NestedReference {
    /// Read a reference from a `category` child; `None` for other children.
    pub fn from_child(child: &RawNode) -> Option<Self> {
        if child.name != "category" {
            return None;
        }
        Some(Self {
            domain: child.attribute("domain")?.to_string(),
            nicename: child.attribute("nicename").unwrap_or_default().to_string(),
            name: child.text.clone(),
        })
    }
}

/// A `<wp:postmeta>` key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub meta_key: String,
    pub meta_value: String,
}

impl MetaEntry {
    pub fn from_child(child: &RawNode) -> Option<Self> {
        if child.name != "postmeta" {
            return None;
        }
        Some(Self {
            meta_key: child.field("meta_key")?.to_string(),
            meta_value: child.field("meta_value").unwrap_or_default().to_string(),
        })
    }
}

/// The finite sequence of top-level nodes of one export, in document order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub nodes: Vec<RawNode>,
}

impl Document {
    pub fn from_nodes(nodes: Vec<RawNode>) -> Self {
        Self { nodes }
    }

    /// Parse a WXR export (`<rss><channel>...</channel></rss>`).
    pub fn parse(xml: &str) -> Result<Self, CoreError> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| CoreError::FatalStructure(format!("XML parse error: {e}")))?;

        let root = doc.root_element();
        if root.tag_name().name() != "rss" {
            return Err(CoreError::FatalStructure(format!(
                "expected <rss> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let channel = root
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "channel")
            .ok_or_else(|| CoreError::FatalStructure("missing <channel> element".to_string()))?;

        let nodes = channel
            .children()
            .filter(|n| n.is_element() && NODE_ELEMENTS.contains(&n.tag_name().name()))
            .map(build_node)
            .collect();

        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn build_node(element: roxmltree::Node<'_, '_>) -> RawNode {
    let mut node = RawNode::new(element.tag_name().name());
    node.text = element_text(element);
    node.attributes = element
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();

    for child in element.children().filter(|n| n.is_element()) {
        let compound =
            child.attributes().next().is_some() || child.children().any(|n| n.is_element());
        if compound {
            node.children.push(build_node(child));
        } else {
            node.fields.insert(field_key(child), element_text(child));
        }
    }
    node
}

/// Field name a leaf element is stored under.
fn field_key(element: roxmltree::Node<'_, '_>) -> String {
    let tag = element.tag_name();
    match (tag.namespace(), tag.name()) {
        (Some(ns), "encoded") if ns.contains(EXCERPT_NAMESPACE_MARKER) => "excerpt".to_string(),
        (_, "encoded") => "content".to_string(),
        (_, "creator") => "dc".to_string(),
        (_, "post_id") => "id".to_string(),
        (_, local) => local.to_string(),
    }
}

/// Concatenated direct text (including CDATA) of an element.
fn element_text(element: roxmltree::Node<'_, '_>) -> String {
    element
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}
