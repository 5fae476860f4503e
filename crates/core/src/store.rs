//! Collaborator interfaces the engine persists through, plus in-memory
//! implementations used for dry runs and tests.
//!
//! The engine never issues storage queries itself; everything goes through
//! [`RecordStore`] and [`IdentityDirectory`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::error::StoreError;
use crate::mapper::WP_ID_ATTRIBUTE;
use crate::types::{DbId, ImportedRecord, MappedAttributes, NaturalKey, RecordShell, RecordType};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Persistence collaborator. Calls are awaited one at a time and are never
/// retried by the engine.
pub trait RecordStore: Send + Sync {
    /// Create a standalone row (tags, blog categories).
    fn create(
        &self,
        record_type: RecordType,
        attributes: &MappedAttributes,
    ) -> impl Future<Output = Result<ImportedRecord, StoreError>> + Send;

    /// Persist an owning record together with its association collections.
    fn persist(
        &self,
        shell: &RecordShell,
        attributes: &MappedAttributes,
    ) -> impl Future<Output = Result<ImportedRecord, StoreError>> + Send;

    /// Look up a previously created term row by natural key.
    fn find_by_natural_key(
        &self,
        record_type: RecordType,
        key: &NaturalKey,
    ) -> impl Future<Output = Result<Option<ImportedRecord>, StoreError>> + Send;

    /// Look up a previously imported blog entry by source post id.
    fn find_entry_by_wp_id(
        &self,
        wp_id: i64,
    ) -> impl Future<Output = Result<Option<ImportedRecord>, StoreError>> + Send;
}

/// An existing user account in the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: DbId,
    pub login: String,
}

/// The record an identity is linked to (the author's bio row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedRecord {
    pub id: DbId,
}

/// User-identity lookup used for author enrichment.
pub trait IdentityDirectory: Send + Sync {
    fn find_user(
        &self,
        login: &str,
    ) -> impl Future<Output = Result<Option<Identity>, StoreError>> + Send;

    fn find_linked_record(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Option<LinkedRecord>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A row held by [`MemoryStore`].
#[derive(Debug, Clone, Serialize)]
pub struct StoredRow {
    pub record: ImportedRecord,
    pub attributes: MappedAttributes,
    pub natural_key: Option<NaturalKey>,
    pub shell: Option<RecordShell>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: DbId,
    rows: Vec<StoredRow>,
    create_calls: BTreeMap<RecordType, usize>,
    rejected_wp_ids: HashSet<i64>,
}

/// Process-local [`RecordStore`]; nothing is durable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `persist` fail for the blog entry with this source id.
    pub fn with_rejected_wp_id(self, wp_id: i64) -> Self {
        self.lock().rejected_wp_ids.insert(wp_id);
        self
    }

    /// Number of `create`/`persist` calls that produced a row of this type.
    pub fn create_count(&self, record_type: RecordType) -> usize {
        self.lock().create_calls.get(&record_type).copied().unwrap_or(0)
    }

    /// Snapshot of every stored row, in creation order.
    pub fn rows(&self) -> Vec<StoredRow> {
        self.lock().rows.clone()
    }

    pub fn rows_of(&self, record_type: RecordType) -> Vec<StoredRow> {
        self.lock()
            .rows
            .iter()
            .filter(|row| row.record.record_type == record_type)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_row(
        &self,
        record_type: RecordType,
        attributes: &MappedAttributes,
        natural_key: Option<NaturalKey>,
        shell: Option<RecordShell>,
    ) -> ImportedRecord {
        let mut state = self.lock();
        state.next_id += 1;
        let record = ImportedRecord {
            record_type,
            id: state.next_id,
        };
        *state.create_calls.entry(record_type).or_insert(0) += 1;
        state.rows.push(StoredRow {
            record: record.clone(),
            attributes: attributes.clone(),
            natural_key,
            shell,
        });
        record
    }
}

fn required_str<'a>(
    record_type: RecordType,
    attributes: &'a MappedAttributes,
    attribute: &str,
) -> Result<&'a str, StoreError> {
    attributes
        .get_str(attribute)
        .ok_or_else(|| StoreError::MissingAttribute {
            record_type,
            attribute: attribute.to_string(),
        })
}

impl RecordStore for MemoryStore {
    async fn create(
        &self,
        record_type: RecordType,
        attributes: &MappedAttributes,
    ) -> Result<ImportedRecord, StoreError> {
        let key = NaturalKey::new(
            required_str(record_type, attributes, "slug")?,
            required_str(record_type, attributes, "title")?,
        );
        Ok(self.insert_row(record_type, attributes, Some(key), None))
    }

    async fn persist(
        &self,
        shell: &RecordShell,
        attributes: &MappedAttributes,
    ) -> Result<ImportedRecord, StoreError> {
        let wp_id = attributes
            .get_i64(WP_ID_ATTRIBUTE)
            .ok_or_else(|| StoreError::MissingAttribute {
                record_type: shell.record_type,
                attribute: WP_ID_ATTRIBUTE.to_string(),
            })?;
        if self.lock().rejected_wp_ids.contains(&wp_id) {
            return Err(StoreError::Rejected {
                record_type: shell.record_type,
                reason: format!("wp_id {wp_id} refused"),
            });
        }
        Ok(self.insert_row(shell.record_type, attributes, None, Some(shell.clone())))
    }

    async fn find_by_natural_key(
        &self,
        record_type: RecordType,
        key: &NaturalKey,
    ) -> Result<Option<ImportedRecord>, StoreError> {
        Ok(self
            .lock()
            .rows
            .iter()
            .find(|row| row.record.record_type == record_type && row.natural_key.as_ref() == Some(key))
            .map(|row| row.record.clone()))
    }

    async fn find_entry_by_wp_id(&self, wp_id: i64) -> Result<Option<ImportedRecord>, StoreError> {
        Ok(self
            .lock()
            .rows
            .iter()
            .find(|row| {
                row.record.record_type == RecordType::BlogEntry
                    && row.attributes.get_i64(WP_ID_ATTRIBUTE) == Some(wp_id)
            })
            .map(|row| row.record.clone()))
    }
}

// ---------------------------------------------------------------------------
// In-memory directory
// ---------------------------------------------------------------------------

/// Fixed set of users keyed by login; empty by default.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: HashMap<String, (Identity, Option<LinkedRecord>)>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, identity: Identity, linked: Option<LinkedRecord>) -> Self {
        self.users.insert(identity.login.clone(), (identity, linked));
        self
    }
}

impl IdentityDirectory for MemoryDirectory {
    async fn find_user(&self, login: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.users.get(login).map(|(identity, _)| identity.clone()))
    }

    async fn find_linked_record(
        &self,
        identity: &Identity,
    ) -> Result<Option<LinkedRecord>, StoreError> {
        Ok(self
            .users
            .get(&identity.login)
            .and_then(|(_, linked)| linked.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn term(slug: &str, title: &str) -> MappedAttributes {
        let mut attrs = MappedAttributes::new();
        attrs.insert("slug", slug);
        attrs.insert("title", title);
        attrs
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.create(RecordType::Tag, &term("a", "A")).await.unwrap();
        let b = store.create(RecordType::Tag, &term("b", "B")).await.unwrap();
        assert_eq!(a.id + 1, b.id);
        assert_eq!(store.create_count(RecordType::Tag), 2);
    }

    #[tokio::test]
    async fn find_by_natural_key_matches_type_and_key() {
        let store = MemoryStore::new();
        let tag = store.create(RecordType::Tag, &term("a", "A")).await.unwrap();
        let key = NaturalKey::new("a", "A");
        assert_eq!(
            store.find_by_natural_key(RecordType::Tag, &key).await.unwrap(),
            Some(tag)
        );
        assert_eq!(
            store.find_by_natural_key(RecordType::BlogCategory, &key).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn create_requires_slug() {
        let store = MemoryStore::new();
        let mut attrs = MappedAttributes::new();
        attrs.insert("title", "A");
        assert_matches!(
            store.create(RecordType::Tag, &attrs).await,
            Err(StoreError::MissingAttribute { .. })
        );
    }

    #[tokio::test]
    async fn persist_and_find_entry() {
        let store = MemoryStore::new();
        let mut attrs = MappedAttributes::new();
        attrs.insert("wp_id", 9);
        let shell = RecordShell::new(RecordType::BlogEntry);
        let entry = store.persist(&shell, &attrs).await.unwrap();
        assert_eq!(store.find_entry_by_wp_id(9).await.unwrap(), Some(entry));
        assert_eq!(store.find_entry_by_wp_id(10).await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejected_entry_fails() {
        let store = MemoryStore::new().with_rejected_wp_id(9);
        let mut attrs = MappedAttributes::new();
        attrs.insert("wp_id", 9);
        let shell = RecordShell::new(RecordType::BlogEntry);
        assert_matches!(
            store.persist(&shell, &attrs).await,
            Err(StoreError::Rejected { .. })
        );
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn directory_lookup() {
        let directory = MemoryDirectory::new().with_user(
            Identity { id: 1, login: "ebutler".to_string() },
            Some(LinkedRecord { id: 40 }),
        );
        let user = directory.find_user("ebutler").await.unwrap().unwrap();
        assert_eq!(
            directory.find_linked_record(&user).await.unwrap(),
            Some(LinkedRecord { id: 40 })
        );
        assert_eq!(directory.find_user("nobody").await.unwrap(), None);
    }
}
