//! Field mapper: raw node fields to target-schema attributes.
//!
//! The correspondence table and the defaults table are the import's data
//! contract with the target schema; keep their key pairs stable.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::associations::AssociationKind;
use crate::document::RawNode;
use crate::error::{CoreError, MappingError};
use crate::status::normalize_status;
use crate::types::{DbId, MappedAttributes, NaturalKey};

// ---------------------------------------------------------------------------
// Correspondence table
// ---------------------------------------------------------------------------

/// How a source field value is converted before storing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Coerced to an integer.
    Identifier,
    /// RFC 2822 date, stored as RFC 3339 UTC text.
    Date,
    /// Passed through the status normalizer.
    Status,
}

/// One source-field to target-field pair.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub source: &'static str,
    pub target: &'static str,
    pub kind: FieldKind,
}

/// Source field name → target attribute name for blog entries.
pub const FIELD_MAP: &[FieldMapping] = &[
    FieldMapping { source: "id", target: "wp_id", kind: FieldKind::Identifier },
    FieldMapping { source: "post_name", target: "slug", kind: FieldKind::Text },
    FieldMapping { source: "title", target: "title", kind: FieldKind::Text },
    FieldMapping { source: "content", target: "content", kind: FieldKind::Text },
    FieldMapping { source: "pubDate", target: "published_at", kind: FieldKind::Date },
    FieldMapping { source: "status", target: "status", kind: FieldKind::Status },
    FieldMapping { source: "excerpt", target: "_teaser", kind: FieldKind::Text },
];

/// Target attribute holding the rewritten body text.
pub const CONTENT_ATTRIBUTE: &str = "content";

/// Target attribute holding the author's linked-record id.
pub const AUTHOR_ATTRIBUTE: &str = "author_id";

/// Target attribute holding the source post id.
pub const WP_ID_ATTRIBUTE: &str = "wp_id";

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Per-run constants seeded into every blog entry before mapped fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ImportDefaults {
    /// Owning blog.
    #[validate(range(min = 1))]
    pub blog_id: DbId,
    #[validate(length(min = 1))]
    pub blog_slug: String,
    /// Author used when the post's creator has no linked record.
    #[validate(range(min = 1))]
    pub author_id: DbId,
}

impl ImportDefaults {
    /// Validate before a run; invalid defaults abort the run up front.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(format!("Invalid import defaults: {e}")))
    }

    /// The DEFAULTS table as attributes.
    pub fn to_attributes(&self) -> MappedAttributes {
        let mut attrs = MappedAttributes::new();
        attrs.insert("blog_id", self.blog_id);
        attrs.insert("blog_slug", self.blog_slug.clone());
        attrs.insert(AUTHOR_ATTRIBUTE, self.author_id);
        attrs.insert("is_published", 0);
        attrs.insert("blog_asset_scheme", "");
        attrs.insert("comment_count", 0);
        attrs
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Build the attribute set for a blog entry node.
///
/// Defaults are seeded first; mapped values overwrite them on collision.
pub fn map_fields(
    node: &RawNode,
    defaults: &ImportDefaults,
) -> Result<MappedAttributes, MappingError> {
    let mut attrs = defaults.to_attributes();

    for mapping in FIELD_MAP {
        let raw = node
            .field(mapping.source)
            .ok_or(MappingError::MissingField(mapping.source))?;

        match mapping.kind {
            FieldKind::Text => attrs.insert(mapping.target, raw),
            FieldKind::Identifier => {
                let id: i64 = raw.trim().parse().map_err(|_| MappingError::InvalidInteger {
                    field: mapping.source,
                    value: raw.to_string(),
                })?;
                attrs.insert(mapping.target, id);
            }
            FieldKind::Date => {
                let parsed = chrono::DateTime::parse_from_rfc2822(raw.trim()).map_err(|_| {
                    MappingError::InvalidDate {
                        field: mapping.source,
                        value: raw.to_string(),
                    }
                })?;
                attrs.insert(
                    mapping.target,
                    parsed.with_timezone(&chrono::Utc).to_rfc3339(),
                );
            }
            FieldKind::Status => attrs.insert(mapping.target, normalize_status(raw)?),
        }
    }

    Ok(attrs)
}

/// Build the attribute set for creating a tag or blog category row.
pub fn map_term(
    kind: AssociationKind,
    key: &NaturalKey,
    defaults: &ImportDefaults,
) -> MappedAttributes {
    let mut attrs = MappedAttributes::new();
    attrs.insert("slug", key.slug.clone());
    attrs.insert("title", key.name.clone());
    if kind == AssociationKind::Category {
        attrs.insert("blog_id", defaults.blog_id);
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn defaults() -> ImportDefaults {
        ImportDefaults {
            blog_id: 22,
            blog_slug: "multi-american".to_string(),
            author_id: 7,
        }
    }

    fn post(status: &str) -> RawNode {
        RawNode::new("item")
            .with_field("id", "101")
            .with_field("post_name", "hello-world")
            .with_field("title", "Hello World")
            .with_field("content", "Body")
            .with_field("pubDate", "Mon, 02 May 2011 18:30:00 +0000")
            .with_field("status", status)
            .with_field("excerpt", "Teaser")
    }

    #[test]
    fn maps_every_correspondence_field() {
        let attrs = map_fields(&post("publish"), &defaults()).unwrap();
        assert_eq!(attrs.get_i64("wp_id"), Some(101));
        assert_eq!(attrs.get_str("slug"), Some("hello-world"));
        assert_eq!(attrs.get_str("title"), Some("Hello World"));
        assert_eq!(attrs.get_str("content"), Some("Body"));
        assert_eq!(attrs.get_str("published_at"), Some("2011-05-02T18:30:00+00:00"));
        assert_eq!(attrs.get_i64("status"), Some(5));
        assert_eq!(attrs.get_str("_teaser"), Some("Teaser"));
    }

    #[test]
    fn seeds_every_default() {
        let attrs = map_fields(&post("publish"), &defaults()).unwrap();
        assert_eq!(attrs.get_i64("blog_id"), Some(22));
        assert_eq!(attrs.get_str("blog_slug"), Some("multi-american"));
        assert_eq!(attrs.get_i64("author_id"), Some(7));
        assert_eq!(attrs.get_i64("is_published"), Some(0));
        assert_eq!(attrs.get_str("blog_asset_scheme"), Some(""));
        assert_eq!(attrs.get_i64("comment_count"), Some(0));
        assert_eq!(attrs.len(), FIELD_MAP.len() + 6);
    }

    #[test]
    fn draft_maps_to_zero() {
        let attrs = map_fields(&post("draft"), &defaults()).unwrap();
        assert_eq!(attrs.get_i64("status"), Some(0));
    }

    #[test]
    fn unknown_status_fails() {
        assert_matches!(
            map_fields(&post("pending"), &defaults()),
            Err(MappingError::UnknownStatus(_))
        );
    }

    #[test]
    fn missing_field_fails() {
        let mut node = post("publish");
        node.fields.remove("excerpt");
        assert_eq!(
            map_fields(&node, &defaults()),
            Err(MappingError::MissingField("excerpt"))
        );
    }

    #[test]
    fn non_numeric_id_fails() {
        let node = post("publish").with_field("id", "abc");
        assert_matches!(
            map_fields(&node, &defaults()),
            Err(MappingError::InvalidInteger { field: "id", .. })
        );
    }

    #[test]
    fn bad_date_fails() {
        let node = post("publish").with_field("pubDate", "yesterday");
        assert_matches!(
            map_fields(&node, &defaults()),
            Err(MappingError::InvalidDate { field: "pubDate", .. })
        );
    }

    #[test]
    fn mapping_is_deterministic() {
        let a = map_fields(&post("publish"), &defaults()).unwrap();
        let b = map_fields(&post("publish"), &defaults()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn term_attributes() {
        let key = NaturalKey::new("news", "News");
        let tag = map_term(AssociationKind::Tag, &key, &defaults());
        assert_eq!(tag.get_str("slug"), Some("news"));
        assert_eq!(tag.get_str("title"), Some("News"));
        assert!(!tag.contains_key("blog_id"));

        let category = map_term(AssociationKind::Category, &key, &defaults());
        assert_eq!(category.get_i64("blog_id"), Some(22));
    }

    #[test]
    fn invalid_defaults_rejected() {
        let bad = ImportDefaults {
            blog_id: 0,
            blog_slug: String::new(),
            author_id: 1,
        };
        assert_matches!(bad.check(), Err(CoreError::Validation(_)));
        assert!(defaults().check().is_ok());
    }
}
