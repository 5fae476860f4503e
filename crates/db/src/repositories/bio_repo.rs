//! Repository for the `bios` table.

use sqlx::PgPool;
use wxr_core::types::DbId;

use crate::models::bio::Bio;

const COLUMNS: &str = "id, user_id, name, created_at";

pub struct BioRepo;

impl BioRepo {
    /// The bio linked to an admin user, if any.
    pub async fn find_by_user_id(pool: &PgPool, user_id: DbId) -> Result<Option<Bio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bios WHERE user_id = $1");
        sqlx::query_as::<_, Bio>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, user_id: DbId, name: &str) -> Result<Bio, sqlx::Error> {
        let query =
            format!("INSERT INTO bios (user_id, name) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Bio>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
