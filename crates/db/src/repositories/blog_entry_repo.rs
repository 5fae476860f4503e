//! Repository for `blog_entries` and its join tables.

use sqlx::PgPool;
use wxr_core::types::DbId;

use crate::models::blog_entry::{BlogEntry, NewBlogEntry};

/// Column list for `blog_entries` queries.
const COLUMNS: &str = "id, wp_id, blog_id, blog_slug, author_id, slug, title, content, \
    teaser, status, is_published, blog_asset_scheme, comment_count, dsq_thread_id, \
    published_at, created_at";

/// Provides inserts and lookups for blog entries.
pub struct BlogEntryRepo;

impl BlogEntryRepo {
    /// Insert an entry together with its tag and category join rows.
    ///
    /// Runs in one transaction; join rows keep the order of the id slices.
    pub async fn create_with_associations(
        pool: &PgPool,
        input: &NewBlogEntry,
        tag_ids: &[DbId],
        category_ids: &[DbId],
    ) -> Result<BlogEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO blog_entries \
                (wp_id, blog_id, blog_slug, author_id, slug, title, content, teaser, \
                 status, is_published, blog_asset_scheme, comment_count, dsq_thread_id, \
                 published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, BlogEntry>(&query)
            .bind(input.wp_id)
            .bind(input.blog_id)
            .bind(&input.blog_slug)
            .bind(input.author_id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.teaser)
            .bind(input.status)
            .bind(input.is_published)
            .bind(&input.blog_asset_scheme)
            .bind(input.comment_count)
            .bind(&input.dsq_thread_id)
            .bind(input.published_at)
            .fetch_one(&mut *tx)
            .await?;

        for (position, tag_id) in (0_i32..).zip(tag_ids) {
            sqlx::query(
                "INSERT INTO blog_entry_tags (blog_entry_id, tag_id, position) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(entry.id)
            .bind(*tag_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        for (position, category_id) in (0_i32..).zip(category_ids) {
            sqlx::query(
                "INSERT INTO blog_entry_categories (blog_entry_id, blog_category_id, position) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(entry.id)
            .bind(*category_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entry)
    }

    /// Find an entry by the source export's post id.
    pub async fn find_by_wp_id(pool: &PgPool, wp_id: i64) -> Result<Option<BlogEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blog_entries WHERE wp_id = $1");
        sqlx::query_as::<_, BlogEntry>(&query)
            .bind(wp_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_for_blog(pool: &PgPool, blog_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blog_entries WHERE blog_id = $1")
            .bind(blog_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
