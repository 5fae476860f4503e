//! Repository for the `admin_users` table.

use sqlx::PgPool;

use crate::models::admin_user::AdminUser;

const COLUMNS: &str = "id, username, created_at";

pub struct AdminUserRepo;

impl AdminUserRepo {
    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_users WHERE username = $1");
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, username: &str) -> Result<AdminUser, sqlx::Error> {
        let query = format!("INSERT INTO admin_users (username) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(username)
            .fetch_one(pool)
            .await
    }
}
