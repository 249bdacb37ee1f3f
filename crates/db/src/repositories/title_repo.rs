//! Repository for the `titles` table.
//!
//! Reads return [`TitleDetail`]: the title joined with its category, its
//! genres and its rating (average review score, one decimal).

use std::collections::HashMap;

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::search::contains_pattern;
use yamdb_core::types::DbId;

use crate::models::genre::Genre;
use crate::models::title::{CreateTitle, Title, TitleDetail, TitleFilter, TitleRow, UpdateTitle};
use crate::repositories::GenreRepo;

const COLUMNS: &str = "id, name, year, description, category_id";

/// Select list for [`TitleRow`]; expects `titles t LEFT JOIN categories c`.
const DETAIL_COLUMNS: &str = "\
    t.id, t.name, t.year, t.description, t.category_id, \
    c.name AS category_name, c.slug AS category_slug, \
    (SELECT ROUND(AVG(r.score)::numeric, 1)::float8 \
       FROM reviews r WHERE r.title_id = t.id) AS rating";

/// Shared `WHERE` clause for list/count; binds `$1..$4` from [`TitleFilter`],
/// with the name already turned into a literal `ILIKE` pattern.
const FILTER_CLAUSE: &str = "\
    ($1::text IS NULL OR c.slug = $1) \
    AND ($2::text IS NULL OR EXISTS ( \
        SELECT 1 FROM genre_titles gt JOIN genres g ON g.id = gt.genre_id \
        WHERE gt.title_id = t.id AND g.slug = $2)) \
    AND ($3::text IS NULL OR t.name ILIKE $3) \
    AND ($4::int IS NULL OR t.year = $4)";

/// Provides CRUD operations for titles.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_genres_inner(&mut tx, title.id, &input.genre_ids).await?;

        tx.commit().await?;
        Ok(title)
    }

    /// Insert a title row with an explicit primary key (bulk import).
    /// Genre links are loaded separately from `genre_title.csv`.
    pub async fn insert_with_id(
        pool: &PgPool,
        id: DbId,
        input: &CreateTitle,
    ) -> Result<Title, sqlx::Error> {
        let query = format!(
            "INSERT INTO titles (id, name, year, description, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM titles WHERE id = $1");
        sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load the API representation of a single title.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<TitleDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM titles t LEFT JOIN categories c ON c.id = t.category_id
             WHERE t.id = $1"
        );
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let mut details = Self::attach_genres(pool, vec![row]).await?;
                Ok(details.pop())
            }
            None => Ok(None),
        }
    }

    /// List titles ordered by id, applying the optional filters.
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<(Vec<TitleDetail>, i64), sqlx::Error> {
        let name_pattern = filter.name.as_deref().map(contains_pattern);

        let count_query = format!(
            "SELECT COUNT(*)
             FROM titles t LEFT JOIN categories c ON c.id = t.category_id
             WHERE {FILTER_CLAUSE}"
        );
        let (count,): (i64,) = sqlx::query_as(&count_query)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(&name_pattern)
            .bind(filter.year)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM titles t LEFT JOIN categories c ON c.id = t.category_id
             WHERE {FILTER_CLAUSE}
             ORDER BY t.id
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(&name_pattern)
            .bind(filter.year)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let details = Self::attach_genres(pool, rows).await?;
        Ok((details, count))
    }

    /// Update a title. Only non-`None` fields are applied; a `Some` genre
    /// list replaces the existing links.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(title) = title else {
            return Ok(None);
        };

        if let Some(genre_ids) = &input.genre_ids {
            Self::set_genres_inner(&mut tx, title.id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(title))
    }

    /// Delete a title. Reviews, comments and genre links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Fetch genres for all `rows` in one query and build the details,
    /// preserving row order.
    async fn attach_genres(
        pool: &PgPool,
        rows: Vec<TitleRow>,
    ) -> Result<Vec<TitleDetail>, sqlx::Error> {
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut by_title: HashMap<DbId, Vec<Genre>> = HashMap::new();
        for link in GenreRepo::list_for_titles(pool, &ids).await? {
            by_title.entry(link.title_id).or_default().push(link.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = by_title.remove(&row.id).unwrap_or_default();
                TitleDetail::from_row(row, genres)
            })
            .collect())
    }

    async fn set_genres_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM genre_titles WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        for &genre_id in genre_ids {
            sqlx::query(
                "INSERT INTO genre_titles (title_id, genre_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(title_id)
            .bind(genre_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
