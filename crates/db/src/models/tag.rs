//! Tag rows.

use serde::Serialize;
use sqlx::FromRow;
use wxr_core::types::{DbId, MappedAttributes, RecordType, Timestamp};
use wxr_core::StoreError;

use super::required_str;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub created_at: Timestamp,
}

/// Insert payload for `tags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub slug: String,
    pub title: String,
}

impl NewTag {
    pub fn from_attributes(attributes: &MappedAttributes) -> Result<Self, StoreError> {
        Ok(Self {
            slug: required_str(attributes, RecordType::Tag, "slug")?,
            title: required_str(attributes, RecordType::Tag, "title")?,
        })
    }
}
