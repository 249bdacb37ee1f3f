//! Category entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `categories` table. The id stays internal; clients
/// address categories by slug.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
}
