//! Blog category rows.

use serde::Serialize;
use sqlx::FromRow;
use wxr_core::types::{DbId, MappedAttributes, RecordType, Timestamp};
use wxr_core::StoreError;

use super::{required_i64, required_str};

/// A row from the `blog_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogCategory {
    pub id: DbId,
    pub blog_id: DbId,
    pub slug: String,
    pub title: String,
    pub created_at: Timestamp,
}

/// Insert payload for `blog_categories`. Categories belong to a blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlogCategory {
    pub blog_id: DbId,
    pub slug: String,
    pub title: String,
}

impl NewBlogCategory {
    pub fn from_attributes(attributes: &MappedAttributes) -> Result<Self, StoreError> {
        let record_type = RecordType::BlogCategory;
        Ok(Self {
            blog_id: required_i64(attributes, record_type, "blog_id")?,
            slug: required_str(attributes, record_type, "slug")?,
            title: required_str(attributes, record_type, "title")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn blog_id_is_required() {
        let mut attrs = MappedAttributes::new();
        attrs.insert("slug", "news");
        attrs.insert("title", "News");
        assert_matches!(
            NewBlogCategory::from_attributes(&attrs),
            Err(StoreError::MissingAttribute { attribute, .. }) if attribute == "blog_id"
        );

        attrs.insert("blog_id", 3);
        assert_eq!(NewBlogCategory::from_attributes(&attrs).unwrap().blog_id, 3);
    }
}
