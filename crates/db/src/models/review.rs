//! Review entity model and read model.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: DbId,
    pub title_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub score: i32,
    pub pub_date: Timestamp,
}

/// API representation: the author is rendered by username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewView {
    pub id: DbId,
    pub text: String,
    pub author: String,
    pub score: i32,
    pub pub_date: Timestamp,
}
