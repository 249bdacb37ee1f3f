//! Genre entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `genres` table. Serialized as `{name, slug}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Genre {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct CreateGenre {
    pub name: String,
    pub slug: String,
}

/// A genre joined to one of its titles, used when loading genres for a
/// page of titles in a single query.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

impl From<TitleGenre> for Genre {
    fn from(row: TitleGenre) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}
