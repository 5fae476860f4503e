//! Repository for the `blog_categories` table.

use sqlx::PgPool;
use wxr_core::types::DbId;

use crate::models::blog_category::{BlogCategory, NewBlogCategory};

/// Column list for `blog_categories` queries.
const COLUMNS: &str = "id, blog_id, slug, title, created_at";

/// Provides lookups and inserts for blog categories.
pub struct BlogCategoryRepo;

impl BlogCategoryRepo {
    /// Insert a category, or return the existing row with the same slug and title.
    pub async fn create(
        pool: &PgPool,
        input: &NewBlogCategory,
    ) -> Result<BlogCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO blog_categories (blog_id, slug, title) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (slug, title) DO UPDATE SET slug = EXCLUDED.slug \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogCategory>(&query)
            .bind(input.blog_id)
            .bind(&input.slug)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_natural_key(
        pool: &PgPool,
        slug: &str,
        title: &str,
    ) -> Result<Option<BlogCategory>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM blog_categories WHERE slug = $1 AND title = $2");
        sqlx::query_as::<_, BlogCategory>(&query)
            .bind(slug)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Categories attached to a blog entry, in attachment order.
    pub async fn list_for_entry(
        pool: &PgPool,
        blog_entry_id: DbId,
    ) -> Result<Vec<BlogCategory>, sqlx::Error> {
        sqlx::query_as::<_, BlogCategory>(
            "SELECT c.id, c.blog_id, c.slug, c.title, c.created_at \
             FROM blog_categories c \
             JOIN blog_entry_categories bec ON bec.blog_category_id = c.id \
             WHERE bec.blog_entry_id = $1 \
             ORDER BY bec.position",
        )
        .bind(blog_entry_id)
        .fetch_all(pool)
        .await
    }
}
