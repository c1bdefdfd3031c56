use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file not found: {}", .0.display())]
    StoreMissing(PathBuf),

    #[error("Schema mismatch: store has columns [{}], got [{}]", .expected.join(", "), .found.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("No table present: {0}")]
    EmptyInput(String),

    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Empty statement")]
    EmptyStatement,

    #[error("Only a single SQL statement can be executed")]
    MultipleStatements,
}

pub type Result<T> = std::result::Result<T, StoreError>;
