//! Repository for the `genres` table and the `genre_titles` association.

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::search::contains_pattern;
use yamdb_core::types::DbId;

use crate::models::genre::{CreateGenre, Genre, TitleGenre};

const COLUMNS: &str = "id, name, slug";

/// Provides create/list/delete for genres and title-genre links.
pub struct GenreRepo;

impl GenreRepo {
    pub async fn create(pool: &PgPool, input: &CreateGenre) -> Result<Genre, sqlx::Error> {
        let query = format!("INSERT INTO genres (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Genre>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Insert a genre with an explicit primary key (bulk import).
    pub async fn insert_with_id(
        pool: &PgPool,
        id: DbId,
        input: &CreateGenre,
    ) -> Result<Genre, sqlx::Error> {
        let query = format!(
            "INSERT INTO genres (id, name, slug) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Genre>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE slug = $1");
        sqlx::query_as::<_, Genre>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every genre whose slug is in `slugs`. Unknown slugs are simply
    /// absent from the result; callers compare lengths to detect them.
    pub async fn find_by_slugs(pool: &PgPool, slugs: &[String]) -> Result<Vec<Genre>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM genres WHERE slug = ANY($1) ORDER BY name");
        sqlx::query_as::<_, Genre>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// List genres ordered by name, optionally filtered by a
    /// case-insensitive name substring.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Genre>, i64), sqlx::Error> {
        let pattern = search.map(contains_pattern);

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM genres
             WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM genres
             WHERE ($1::text IS NULL OR name ILIKE $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        );
        let genres = sqlx::query_as::<_, Genre>(&query)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((genres, count))
    }

    /// Delete a genre by slug. Its title links cascade.
    pub async fn delete_by_slug(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM genres WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Genres for a batch of titles, ordered by name within each title.
    pub async fn list_for_titles(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<Vec<TitleGenre>, sqlx::Error> {
        sqlx::query_as::<_, TitleGenre>(
            "SELECT gt.title_id, g.id, g.name, g.slug
             FROM genre_titles gt
             JOIN genres g ON g.id = gt.genre_id
             WHERE gt.title_id = ANY($1)
             ORDER BY gt.title_id, g.name",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await
    }

    /// Link a genre to a title with an explicit association id (bulk import).
    pub async fn link_title_with_id(
        pool: &PgPool,
        id: DbId,
        title_id: DbId,
        genre_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO genre_titles (id, title_id, genre_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(title_id)
            .bind(genre_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
