//! PostgreSQL implementation of the engine's collaborator traits.

use wxr_core::store::{Identity, IdentityDirectory, LinkedRecord, RecordStore};
use wxr_core::types::{ImportedRecord, MappedAttributes, NaturalKey, RecordShell, RecordType};
use wxr_core::StoreError;

use crate::models::blog_category::NewBlogCategory;
use crate::models::blog_entry::NewBlogEntry;
use crate::models::tag::NewTag;
use crate::repositories::{AdminUserRepo, BioRepo, BlogCategoryRepo, BlogEntryRepo, TagRepo};
use crate::DbPool;

/// Record store and identity directory over a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Unique violations become rejections; everything else is a backend error.
fn store_error(record_type: RecordType, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Rejected {
                record_type,
                reason: db.message().to_string(),
            };
        }
    }
    StoreError::Backend(Box::new(err))
}

fn ids_of(records: &[ImportedRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

impl RecordStore for PgStore {
    async fn create(
        &self,
        record_type: RecordType,
        attributes: &MappedAttributes,
    ) -> Result<ImportedRecord, StoreError> {
        let id = match record_type {
            RecordType::Tag => {
                let input = NewTag::from_attributes(attributes)?;
                TagRepo::create(&self.pool, &input)
                    .await
                    .map_err(|e| store_error(record_type, e))?
                    .id
            }
            RecordType::BlogCategory => {
                let input = NewBlogCategory::from_attributes(attributes)?;
                BlogCategoryRepo::create(&self.pool, &input)
                    .await
                    .map_err(|e| store_error(record_type, e))?
                    .id
            }
            RecordType::BlogEntry => {
                return Err(StoreError::Rejected {
                    record_type,
                    reason: "blog entries are written through persist".to_string(),
                })
            }
        };
        tracing::debug!(%record_type, id, "Inserted term row");
        Ok(ImportedRecord { record_type, id })
    }

    async fn persist(
        &self,
        shell: &RecordShell,
        attributes: &MappedAttributes,
    ) -> Result<ImportedRecord, StoreError> {
        let input = NewBlogEntry::from_attributes(attributes, shell.dsq_thread_id.clone())?;
        let entry = BlogEntryRepo::create_with_associations(
            &self.pool,
            &input,
            &ids_of(&shell.tags),
            &ids_of(&shell.blog_categories),
        )
        .await
        .map_err(|e| store_error(shell.record_type, e))?;

        tracing::debug!(id = entry.id, wp_id = entry.wp_id, "Inserted blog entry");
        Ok(ImportedRecord {
            record_type: shell.record_type,
            id: entry.id,
        })
    }

    async fn find_by_natural_key(
        &self,
        record_type: RecordType,
        key: &NaturalKey,
    ) -> Result<Option<ImportedRecord>, StoreError> {
        let id = match record_type {
            RecordType::Tag => TagRepo::find_by_natural_key(&self.pool, &key.slug, &key.name)
                .await
                .map_err(|e| store_error(record_type, e))?
                .map(|row| row.id),
            RecordType::BlogCategory => {
                BlogCategoryRepo::find_by_natural_key(&self.pool, &key.slug, &key.name)
                    .await
                    .map_err(|e| store_error(record_type, e))?
                    .map(|row| row.id)
            }
            RecordType::BlogEntry => None,
        };
        Ok(id.map(|id| ImportedRecord { record_type, id }))
    }

    async fn find_entry_by_wp_id(&self, wp_id: i64) -> Result<Option<ImportedRecord>, StoreError> {
        let entry = BlogEntryRepo::find_by_wp_id(&self.pool, wp_id)
            .await
            .map_err(|e| store_error(RecordType::BlogEntry, e))?;
        Ok(entry.map(|row| ImportedRecord {
            record_type: RecordType::BlogEntry,
            id: row.id,
        }))
    }
}

impl IdentityDirectory for PgStore {
    async fn find_user(&self, login: &str) -> Result<Option<Identity>, StoreError> {
        let user = AdminUserRepo::find_by_username(&self.pool, login)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(user.map(Identity::from))
    }

    async fn find_linked_record(
        &self,
        identity: &Identity,
    ) -> Result<Option<LinkedRecord>, StoreError> {
        let bio = BioRepo::find_by_user_id(&self.pool, identity.id)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(bio.map(LinkedRecord::from))
    }
}
