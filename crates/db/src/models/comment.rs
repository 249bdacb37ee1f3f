//! Comment entity model and read model.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub review_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub pub_date: Timestamp,
}

/// API representation: the author is rendered by username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentView {
    pub id: DbId,
    pub text: String,
    pub author: String,
    pub pub_date: Timestamp,
}
