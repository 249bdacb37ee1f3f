use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;

/// Why a single CSV row could not be imported.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("malformed record: {0}")]
    Malformed(#[from] csv::Error),

    #[error("no {table} row with id {id}")]
    MissingReference { table: &'static str, id: DbId },

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A failed import. The load stops at the first one.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("{file}: cannot open: {source}")]
    Open {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// `row` is 1-based and does not count the header.
    #[error("{file}, row {row}: {source}")]
    Row {
        file: String,
        row: usize,
        #[source]
        source: RowError,
    },

    #[error("{file}: failed to advance id sequence: {source}")]
    Sequence {
        file: String,
        #[source]
        source: sqlx::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_error_names_file_and_row() {
        let err = ImportError::Row {
            file: "review.csv".into(),
            row: 3,
            source: RowError::MissingReference {
                table: "users",
                id: 42,
            },
        };
        assert_eq!(err.to_string(), "review.csv, row 3: no users row with id 42");
    }
}
