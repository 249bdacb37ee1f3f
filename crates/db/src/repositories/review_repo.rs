//! Repository for the `reviews` table.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::types::{DbId, Timestamp};

use crate::models::review::{Review, ReviewView};

const COLUMNS: &str = "id, title_id, author_id, text, score, pub_date";

/// Select list for [`ReviewView`]; expects `reviews r JOIN users u`.
const VIEW_COLUMNS: &str = "r.id, r.text, u.username AS author, r.score, r.pub_date";

/// Provides CRUD operations for reviews, always scoped to a title.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review and return its API representation.
    ///
    /// A second review by the same author on the same title violates
    /// `uq_reviews_author_title`.
    pub async fn create(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
        text: &str,
        score: i32,
    ) -> Result<ReviewView, sqlx::Error> {
        sqlx::query_as::<_, ReviewView>(
            "WITH r AS (
                INSERT INTO reviews (title_id, author_id, text, score)
                VALUES ($1, $2, $3, $4)
                RETURNING id, author_id, text, score, pub_date
             )
             SELECT r.id, r.text, u.username AS author, r.score, r.pub_date
             FROM r JOIN users u ON u.id = r.author_id",
        )
        .bind(title_id)
        .bind(author_id)
        .bind(text)
        .bind(score)
        .fetch_one(pool)
        .await
    }

    /// Insert a review with explicit id and publication date (bulk import).
    pub async fn insert_with_id(
        pool: &PgPool,
        id: DbId,
        title_id: DbId,
        author_id: DbId,
        text: &str,
        score: i32,
        pub_date: Timestamp,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (id, title_id, author_id, text, score, pub_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(title_id)
            .bind(author_id)
            .bind(text)
            .bind(score)
            .bind(pub_date)
            .fetch_one(pool)
            .await
    }

    /// Whether `author_id` has already reviewed `title_id`.
    pub async fn exists_for_author(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id)
        .bind(author_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Find a review by id, only if it belongs to `title_id`.
    pub async fn find(
        pool: &PgPool,
        title_id: DbId,
        review_id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1 AND title_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(review_id)
            .bind(title_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_view(pool: &PgPool, review_id: DbId) -> Result<Option<ReviewView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM reviews r JOIN users u ON u.id = r.author_id
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, ReviewView>(&query)
            .bind(review_id)
            .fetch_optional(pool)
            .await
    }

    /// List a title's reviews, newest first.
    pub async fn list(
        pool: &PgPool,
        title_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<ReviewView>, i64), sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {VIEW_COLUMNS} FROM reviews r JOIN users u ON u.id = r.author_id
             WHERE r.title_id = $1
             ORDER BY r.pub_date DESC, r.id DESC
             LIMIT $2 OFFSET $3"
        );
        let reviews = sqlx::query_as::<_, ReviewView>(&query)
            .bind(title_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((reviews, count))
    }

    /// Update text and/or score. Returns `false` if the review is gone.
    pub async fn update(
        pool: &PgPool,
        review_id: DbId,
        text: Option<&str>,
        score: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reviews SET
                text = COALESCE($2, text),
                score = COALESCE($3, score)
             WHERE id = $1",
        )
        .bind(review_id)
        .bind(text)
        .bind(score)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a review. Its comments cascade.
    pub async fn delete(pool: &PgPool, review_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All scores for a title, used to cross-check the SQL rating.
    pub async fn scores_for_title(pool: &PgPool, title_id: DbId) -> Result<Vec<i32>, sqlx::Error> {
        let rows: Vec<(i32,)> = sqlx::query_as("SELECT score FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }
}
