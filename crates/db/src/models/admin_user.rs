//! Admin user rows, looked up by login for author enrichment.

use serde::Serialize;
use sqlx::FromRow;
use wxr_core::store::Identity;
use wxr_core::types::{DbId, Timestamp};

/// A row from the `admin_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminUser {
    pub id: DbId,
    pub username: String,
    pub created_at: Timestamp,
}

impl From<AdminUser> for Identity {
    fn from(user: AdminUser) -> Self {
        Identity {
            id: user.id,
            login: user.username,
        }
    }
}
