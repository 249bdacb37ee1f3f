//! Repository for the `comments` table.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::{DbId, Timestamp};

use crate::models::comment::{Comment, CommentView};

const COLUMNS: &str = "id, review_id, author_id, text, pub_date";

const VIEW_COLUMNS: &str = "c.id, c.text, u.username AS author, c.pub_date";

/// Provides CRUD operations for comments, always scoped to a review.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment and return its API representation.
    pub async fn create(
        pool: &PgPool,
        review_id: DbId,
        author_id: DbId,
        text: &str,
    ) -> Result<CommentView, sqlx::Error> {
        sqlx::query_as::<_, CommentView>(
            "WITH c AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, text, pub_date
             )
             SELECT c.id, c.text, u.username AS author, c.pub_date
             FROM c JOIN users u ON u.id = c.author_id",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(pool)
        .await
    }

    /// Insert a comment with explicit id and publication date (bulk import).
    pub async fn insert_with_id(
        pool: &PgPool,
        id: DbId,
        review_id: DbId,
        author_id: DbId,
        text: &str,
        pub_date: Timestamp,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (id, review_id, author_id, text, pub_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(review_id)
            .bind(author_id)
            .bind(text)
            .bind(pub_date)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by id, only if it belongs to `review_id`.
    pub async fn find(
        pool: &PgPool,
        review_id: DbId,
        comment_id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 AND review_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(comment_id)
            .bind(review_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_view(
        pool: &PgPool,
        comment_id: DbId,
    ) -> Result<Option<CommentView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CommentView>(&query)
            .bind(comment_id)
            .fetch_optional(pool)
            .await
    }

    /// List a review's comments, oldest first.
    pub async fn list(
        pool: &PgPool,
        review_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<CommentView>, i64), sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1
             ORDER BY c.pub_date, c.id
             LIMIT $2 OFFSET $3"
        );
        let comments = sqlx::query_as::<_, CommentView>(&query)
            .bind(review_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((comments, count))
    }

    pub async fn update_text(pool: &PgPool, comment_id: DbId, text: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment_id)
            .bind(text)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, comment_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
