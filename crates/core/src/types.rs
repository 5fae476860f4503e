//! Shared value types passed between the engine and its collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All target-store primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Kind of row the engine asks the store to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    BlogEntry,
    Tag,
    BlogCategory,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogEntry => "blog_entry",
            Self::Tag => "tag",
            Self::BlogCategory => "blog_category",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row the store has created (or already had) for an imported node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedRecord {
    pub record_type: RecordType,
    pub id: DbId,
}

/// Field combination identifying the same term across references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey {
    pub slug: String,
    pub name: String,
}

impl NaturalKey {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.slug, self.name)
    }
}

// ---------------------------------------------------------------------------
// Mapped attributes
// ---------------------------------------------------------------------------

/// Target-schema attribute set produced for one node.
///
/// Backed by a `BTreeMap` so iteration (and serialized output) is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedAttributes(BTreeMap<String, Value>);

impl MappedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String value of `key`, or `None` when absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Integer value of `key`, or `None` when absent or not an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Record shell
// ---------------------------------------------------------------------------

/// The owning record assembled alongside its attributes before persisting.
///
/// Association collections keep the order in which references appeared on
/// the source node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordShell {
    pub record_type: RecordType,
    pub tags: Vec<ImportedRecord>,
    pub blog_categories: Vec<ImportedRecord>,
    pub dsq_thread_id: Option<String>,
}

impl RecordShell {
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            tags: Vec::new(),
            blog_categories: Vec::new(),
            dsq_thread_id: None,
        }
    }
}
