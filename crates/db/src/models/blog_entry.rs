//! Blog entry rows and the insert DTO built from mapped attributes.

use serde::Serialize;
use sqlx::FromRow;
use wxr_core::types::{DbId, MappedAttributes, RecordType, Timestamp};
use wxr_core::StoreError;

use super::{required_i32, required_i64, required_str};

const RECORD_TYPE: RecordType = RecordType::BlogEntry;

/// A row from the `blog_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogEntry {
    pub id: DbId,
    pub wp_id: i64,
    pub blog_id: DbId,
    pub blog_slug: String,
    pub author_id: DbId,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub teaser: String,
    pub status: i32,
    pub is_published: i32,
    pub blog_asset_scheme: String,
    pub comment_count: i32,
    pub dsq_thread_id: Option<String>,
    pub published_at: Timestamp,
    pub created_at: Timestamp,
}

/// Insert payload for `blog_entries`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlogEntry {
    pub wp_id: i64,
    pub blog_id: DbId,
    pub blog_slug: String,
    pub author_id: DbId,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub teaser: String,
    pub status: i32,
    pub is_published: i32,
    pub blog_asset_scheme: String,
    pub comment_count: i32,
    pub dsq_thread_id: Option<String>,
    pub published_at: Timestamp,
}

impl NewBlogEntry {
    pub fn from_attributes(
        attributes: &MappedAttributes,
        dsq_thread_id: Option<String>,
    ) -> Result<Self, StoreError> {
        let raw_date = required_str(attributes, RECORD_TYPE, "published_at")?;
        let published_at = chrono::DateTime::parse_from_rfc3339(&raw_date)
            .map_err(|e| StoreError::Rejected {
                record_type: RECORD_TYPE,
                reason: format!("published_at '{raw_date}': {e}"),
            })?
            .with_timezone(&chrono::Utc);

        Ok(Self {
            wp_id: required_i64(attributes, RECORD_TYPE, "wp_id")?,
            blog_id: required_i64(attributes, RECORD_TYPE, "blog_id")?,
            blog_slug: required_str(attributes, RECORD_TYPE, "blog_slug")?,
            author_id: required_i64(attributes, RECORD_TYPE, "author_id")?,
            slug: required_str(attributes, RECORD_TYPE, "slug")?,
            title: required_str(attributes, RECORD_TYPE, "title")?,
            content: required_str(attributes, RECORD_TYPE, "content")?,
            teaser: attributes.get_str("_teaser").unwrap_or_default().to_string(),
            status: required_i32(attributes, RECORD_TYPE, "status")?,
            is_published: required_i32(attributes, RECORD_TYPE, "is_published")?,
            blog_asset_scheme: required_str(attributes, RECORD_TYPE, "blog_asset_scheme")?,
            comment_count: required_i32(attributes, RECORD_TYPE, "comment_count")?,
            dsq_thread_id,
            published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn attributes() -> MappedAttributes {
        let mut attrs = MappedAttributes::new();
        attrs.insert("wp_id", 101);
        attrs.insert("blog_id", 22);
        attrs.insert("blog_slug", "multi-american");
        attrs.insert("author_id", 7);
        attrs.insert("slug", "hello-world");
        attrs.insert("title", "Hello World");
        attrs.insert("content", "Body");
        attrs.insert("_teaser", "Short");
        attrs.insert("status", 5);
        attrs.insert("is_published", 0);
        attrs.insert("blog_asset_scheme", "");
        attrs.insert("comment_count", 0);
        attrs.insert("published_at", "2011-05-02T18:30:00+00:00");
        attrs
    }

    #[test]
    fn builds_from_complete_attributes() {
        let entry = NewBlogEntry::from_attributes(&attributes(), Some("42".to_string())).unwrap();
        assert_eq!(entry.wp_id, 101);
        assert_eq!(entry.teaser, "Short");
        assert_eq!(entry.status, 5);
        assert_eq!(entry.dsq_thread_id.as_deref(), Some("42"));
        assert_eq!(entry.published_at.to_rfc3339(), "2011-05-02T18:30:00+00:00");
    }

    #[test]
    fn missing_attribute_is_reported() {
        let mut attrs = MappedAttributes::new();
        attrs.insert("published_at", "2011-05-02T18:30:00+00:00");
        assert_matches!(
            NewBlogEntry::from_attributes(&attrs, None),
            Err(StoreError::MissingAttribute { attribute, .. }) if attribute == "wp_id"
        );
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut attrs = attributes();
        attrs.insert("published_at", "yesterday");
        assert_matches!(
            NewBlogEntry::from_attributes(&attrs, None),
            Err(StoreError::Rejected { .. })
        );
    }
}
