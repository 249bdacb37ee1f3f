//! CSV bulk loader.
//!
//! Files are loaded in dependency order so every foreign key points at a
//! row that is already present. The first bad row stops the whole load;
//! rows loaded before it stay loaded and their id sequences are advanced.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use sqlx::PgPool;
use yamdb_core::rating::average_score;
use yamdb_db::{sync_id_sequence, Table};

use crate::error::{ImportError, RowError};
use crate::records::{
    CategoryRecord, CommentRecord, GenreRecord, GenreTitleRecord, Import, ReviewRecord,
    TitleRecord, UserRecord,
};

/// One fixture file and the table it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Users,
    Categories,
    Genres,
    Titles,
    Reviews,
    Comments,
    GenreTitles,
}

impl Dataset {
    /// Parents before children.
    pub const LOAD_ORDER: [Dataset; 7] = [
        Dataset::Users,
        Dataset::Categories,
        Dataset::Genres,
        Dataset::Titles,
        Dataset::Reviews,
        Dataset::Comments,
        Dataset::GenreTitles,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Users => "users.csv",
            Dataset::Categories => "category.csv",
            Dataset::Genres => "genre.csv",
            Dataset::Titles => "titles.csv",
            Dataset::Reviews => "review.csv",
            Dataset::Comments => "comments.csv",
            Dataset::GenreTitles => "genre_title.csv",
        }
    }

    pub fn table(self) -> Table {
        match self {
            Dataset::Users => Table::Users,
            Dataset::Categories => Table::Categories,
            Dataset::Genres => Table::Genres,
            Dataset::Titles => Table::Titles,
            Dataset::Reviews => Table::Reviews,
            Dataset::Comments => Table::Comments,
            Dataset::GenreTitles => Table::GenreTitles,
        }
    }
}

/// Outcome for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub dataset: Dataset,
    /// `None` when the file was absent and skipped.
    pub rows: Option<usize>,
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub files: Vec<FileReport>,
    /// Mean of all imported review scores, one decimal.
    pub mean_score: Option<f64>,
}

impl LoadReport {
    pub fn rows_loaded(&self, dataset: Dataset) -> Option<usize> {
        self.files
            .iter()
            .find(|f| f.dataset == dataset)
            .and_then(|f| f.rows)
    }
}

/// Rows imported from one file, plus any review scores seen.
struct FileSummary {
    rows: usize,
    scores: Vec<i32>,
}

/// Load every known fixture file found in `dir`.
pub async fn load_dir(pool: &PgPool, dir: &Path) -> Result<LoadReport, ImportError> {
    let mut report = LoadReport::default();
    let mut scores = Vec::new();

    for dataset in Dataset::LOAD_ORDER {
        let file = dataset.file_name();
        let path = dir.join(file);

        if !path.is_file() {
            tracing::warn!(file, dir = %dir.display(), "CSV file not found, skipping");
            report.files.push(FileReport {
                dataset,
                rows: None,
            });
            continue;
        }

        tracing::info!(file, "Loading");
        let loaded = load_dataset(pool, dataset, &path).await;

        // Rows inserted before a failing row stay, so the sequence must
        // move past them either way.
        let synced = sync_id_sequence(pool, dataset.table())
            .await
            .map_err(|source| ImportError::Sequence {
                file: file.to_string(),
                source,
            });
        let summary = loaded?;
        synced?;

        tracing::info!(file, rows = summary.rows, "Loaded");
        scores.extend(summary.scores);
        report.files.push(FileReport {
            dataset,
            rows: Some(summary.rows),
        });
    }

    report.mean_score = average_score(&scores);
    Ok(report)
}

async fn load_dataset(
    pool: &PgPool,
    dataset: Dataset,
    path: &Path,
) -> Result<FileSummary, ImportError> {
    let file = dataset.file_name();
    match dataset {
        Dataset::Users => load_file::<UserRecord>(pool, file, path).await,
        Dataset::Categories => load_file::<CategoryRecord>(pool, file, path).await,
        Dataset::Genres => load_file::<GenreRecord>(pool, file, path).await,
        Dataset::Titles => load_file::<TitleRecord>(pool, file, path).await,
        Dataset::Reviews => load_file::<ReviewRecord>(pool, file, path).await,
        Dataset::Comments => load_file::<CommentRecord>(pool, file, path).await,
        Dataset::GenreTitles => load_file::<GenreTitleRecord>(pool, file, path).await,
    }
}

/// Insert the rows of one file one at a time, stopping at the first error.
async fn load_file<R: Import>(
    pool: &PgPool,
    file: &str,
    path: &Path,
) -> Result<FileSummary, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| ImportError::Open {
            file: file.to_string(),
            source,
        })?;

    let mut summary = FileSummary {
        rows: 0,
        scores: Vec::new(),
    };

    for (index, result) in reader.deserialize::<R>().enumerate() {
        let row = index + 1;
        let at = |source: RowError| ImportError::Row {
            file: file.to_string(),
            row,
            source,
        };

        let record = result.map_err(|e| at(RowError::from(e)))?;
        record.import(pool).await.map_err(at)?;

        if let Some(score) = record.score() {
            summary.scores.push(score);
        }
        summary.rows += 1;
    }

    Ok(summary)
}
