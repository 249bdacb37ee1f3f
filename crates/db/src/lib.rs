//! PostgreSQL access for YaMDb: pool setup, migrations, models and
//! repositories.

use sqlx::postgres::PgPoolOptions;
use yamdb_core::types::DbId;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Tables whose rows are loaded with explicit ids by the bulk importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Categories,
    Genres,
    Titles,
    GenreTitles,
    Reviews,
    Comments,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Categories => "categories",
            Table::Genres => "genres",
            Table::Titles => "titles",
            Table::GenreTitles => "genre_titles",
            Table::Reviews => "reviews",
            Table::Comments => "comments",
        }
    }
}

/// Whether a row with primary key `id` exists in `table`.
pub async fn row_exists(pool: &DbPool, table: Table, id: DbId) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table.name());
    let (exists,): (bool,) = sqlx::query_as(&query).bind(id).fetch_one(pool).await?;
    Ok(exists)
}

/// Move the `id` sequence of `table` past the largest id in use.
///
/// Needed after inserting rows with explicit ids, otherwise the next
/// `BIGSERIAL` default collides with an imported row.
pub async fn sync_id_sequence(pool: &DbPool, table: Table) -> Result<(), sqlx::Error> {
    let name = table.name();
    let query = format!(
        "SELECT setval(pg_get_serial_sequence('{name}', 'id'), \
                       COALESCE((SELECT MAX(id) FROM {name}), 1), \
                       (SELECT MAX(id) IS NOT NULL FROM {name}))"
    );
    sqlx::query(&query).execute(pool).await?;
    tracing::debug!(table = name, "Id sequence synchronised");
    Ok(())
}
