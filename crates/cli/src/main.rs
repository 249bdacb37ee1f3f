use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yamdb_cli::loader::load_dir;
use yamdb_cli::superuser::create_superuser;

/// YaMDb operator tools.
#[derive(Parser, Debug)]
#[command(name = "yamdb-cli", version, about = "YaMDb operator tools")]
struct Cli {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bulk-load the fixture CSV files from a directory.
    LoadCsv {
        /// Directory holding users.csv, category.csv, genre.csv, ...
        #[arg(long, env = "CSV_DIR", default_value = "static/data")]
        dir: PathBuf,
    },
    /// Create a superuser, or promote an existing account.
    CreateSuperuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamdb_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let pool = yamdb_db::create_pool(&cli.database_url)
        .await
        .context("Failed to connect to database")?;
    yamdb_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    match cli.command {
        Command::LoadCsv { dir } => {
            let report = load_dir(&pool, &dir)
                .await
                .with_context(|| format!("CSV load from {} aborted", dir.display()))?;
            let loaded = report.files.iter().filter(|f| f.rows.is_some()).count();
            tracing::info!(
                files = loaded,
                skipped = report.files.len() - loaded,
                mean_score = ?report.mean_score,
                "Data loaded successfully"
            );
        }
        Command::CreateSuperuser { username, email } => {
            create_superuser(&pool, &username, &email)
                .await
                .with_context(|| format!("Failed to create superuser '{username}'"))?;
        }
    }

    Ok(())
}
