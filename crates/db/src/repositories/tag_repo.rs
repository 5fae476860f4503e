//! Repository for the `tags` table.

use sqlx::PgPool;
use wxr_core::types::DbId;

use crate::models::tag::{NewTag, Tag};

/// Column list for `tags` queries.
const COLUMNS: &str = "id, slug, title, created_at";

/// Provides lookups and inserts for tags.
pub struct TagRepo;

impl TagRepo {
    /// Insert a tag, or return the existing row with the same slug and title.
    pub async fn create(pool: &PgPool, input: &NewTag) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (slug, title) \
             VALUES ($1, $2) \
             ON CONFLICT (slug, title) DO UPDATE SET slug = EXCLUDED.slug \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(&input.slug)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a tag by its natural key (slug and title, both exact).
    pub async fn find_by_natural_key(
        pool: &PgPool,
        slug: &str,
        title: &str,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE slug = $1 AND title = $2");
        sqlx::query_as::<_, Tag>(&query)
            .bind(slug)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Tags attached to a blog entry, in attachment order.
    pub async fn list_for_entry(pool: &PgPool, blog_entry_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.slug, t.title, t.created_at \
             FROM tags t \
             JOIN blog_entry_tags bet ON bet.tag_id = t.id \
             WHERE bet.blog_entry_id = $1 \
             ORDER BY bet.position",
        )
        .bind(blog_entry_id)
        .fetch_all(pool)
        .await
    }
}
