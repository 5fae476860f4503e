//! Closed set of node variants and their per-variant capabilities.

use serde::Serialize;

use crate::associations::AssociationKind;
use crate::document::RawNode;
use crate::types::RecordType;

/// Postmeta key holding the page template; it has no target counterpart.
pub const PAGE_TEMPLATE_META_KEY: &str = "_wp_page_template";

/// Variant of a top-level export node, dispatched by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Post,
    Page,
    Tag,
    Category,
    /// Attachments, menu items, authors and other nodes with no target.
    Unsupported,
}

impl NodeKind {
    /// Classify a top-level node by element name and `post_type`.
    pub fn classify(node: &RawNode) -> Self {
        match node.name.as_str() {
            "item" => match node.field("post_type").unwrap_or("post") {
                "post" => Self::Post,
                "page" => Self::Page,
                _ => Self::Unsupported,
            },
            "tag" => Self::Tag,
            "category" => Self::Category,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
            Self::Tag => "tag",
            Self::Category => "category",
            Self::Unsupported => "unsupported",
        }
    }

    /// Record type persisted for an owning node of this kind.
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            Self::Post | Self::Page => Some(RecordType::BlogEntry),
            Self::Tag | Self::Category | Self::Unsupported => None,
        }
    }

    /// The association kind this node registers as a standalone term.
    pub fn registers_as(&self) -> Option<AssociationKind> {
        match self {
            Self::Tag => Some(AssociationKind::Tag),
            Self::Category => Some(AssociationKind::Category),
            _ => None,
        }
    }

    /// Association kinds resolved for owning nodes of this kind.
    pub fn association_kinds(&self) -> &'static [AssociationKind] {
        match self {
            Self::Post | Self::Page => &[AssociationKind::Tag, AssociationKind::Category],
            _ => &[],
        }
    }

    /// Variant-specific node rejection, applied on top of the base filter.
    pub fn rejects_node(&self, node: &RawNode) -> bool {
        match self {
            Self::Tag | Self::Category => match self.registers_as() {
                Some(kind) => {
                    let (slug_field, _) = kind.pool_key_fields();
                    node.field(slug_field).map_or(true, str::is_empty)
                }
                None => true,
            },
            Self::Unsupported => true,
            Self::Post | Self::Page => false,
        }
    }

    /// Variant-specific child rejection, applied on top of the base filter.
    pub fn rejects_child(&self, child: &RawNode) -> bool {
        match self {
            Self::Page => {
                child.name == "postmeta" && child.field("meta_key") == Some(PAGE_TEMPLATE_META_KEY)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_items_by_post_type() {
        let post = RawNode::new("item").with_field("post_type", "post");
        let page = RawNode::new("item").with_field("post_type", "page");
        let attachment = RawNode::new("item").with_field("post_type", "attachment");
        assert_eq!(NodeKind::classify(&post), NodeKind::Post);
        assert_eq!(NodeKind::classify(&page), NodeKind::Page);
        assert_eq!(NodeKind::classify(&attachment), NodeKind::Unsupported);
    }

    #[test]
    fn item_without_post_type_is_post() {
        assert_eq!(NodeKind::classify(&RawNode::new("item")), NodeKind::Post);
    }

    #[test]
    fn classify_terms_and_others() {
        assert_eq!(NodeKind::classify(&RawNode::new("tag")), NodeKind::Tag);
        assert_eq!(NodeKind::classify(&RawNode::new("category")), NodeKind::Category);
        assert_eq!(NodeKind::classify(&RawNode::new("author")), NodeKind::Unsupported);
    }

    #[test]
    fn term_without_slug_is_rejected() {
        let tag = RawNode::new("tag").with_field("tag_name", "Foo");
        assert!(NodeKind::Tag.rejects_node(&tag));
        let tag = tag.with_field("tag_slug", "foo");
        assert!(!NodeKind::Tag.rejects_node(&tag));
    }

    #[test]
    fn page_drops_template_meta() {
        let meta = RawNode::new("postmeta")
            .with_field("meta_key", PAGE_TEMPLATE_META_KEY)
            .with_field("meta_value", "default");
        assert!(NodeKind::Page.rejects_child(&meta));
        assert!(!NodeKind::Post.rejects_child(&meta));
    }

    #[test]
    fn only_posts_and_pages_have_record_types() {
        assert_eq!(NodeKind::Post.record_type(), Some(RecordType::BlogEntry));
        assert_eq!(NodeKind::Tag.record_type(), None);
        assert!(NodeKind::Tag.association_kinds().is_empty());
    }
}
