//! PostgreSQL storage for imported blog content.
//!
//! - [`repositories`]: zero-sized `XxxRepo` structs with async queries.
//! - [`models`]: row structs and conversions from engine attribute sets.
//! - [`PgStore`]: the engine's [`RecordStore`](wxr_core::RecordStore) and
//!   [`IdentityDirectory`](wxr_core::IdentityDirectory) backed by a pool.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::PgStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `./migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
