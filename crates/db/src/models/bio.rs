//! Author bio rows; a bio is the record an admin user is linked to.

use serde::Serialize;
use sqlx::FromRow;
use wxr_core::store::LinkedRecord;
use wxr_core::types::{DbId, Timestamp};

/// A row from the `bios` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bio {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<Bio> for LinkedRecord {
    fn from(bio: Bio) -> Self {
        LinkedRecord { id: bio.id }
    }
}
