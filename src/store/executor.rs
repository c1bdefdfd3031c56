use rusqlite::Batch;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::table::{Row, Value};

use super::adapter::open_existing;
use super::error::{Result, StoreError};

/// Rows returned by a successful statement, with the column names the
/// statement reported. An empty `rows` is still a success.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one result column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// A statement that failed to run. Callers treat this as "no result",
/// which is different from a result with zero rows.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl From<StoreError> for ExecutionError {
    fn from(err: StoreError) -> Self {
        let message = match err {
            StoreError::Sqlite(e) => e.to_string(),
            other => other.to_string(),
        };
        Self { message }
    }
}

/// Runs arbitrary SQL text against the store file.
///
/// The text is untrusted: it is executed verbatim as exactly one
/// statement, without parameters, against a disposable single-user store.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    path: PathBuf,
}

impl QueryExecutor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn execute(&self, sql: &str) -> std::result::Result<QueryResult, ExecutionError> {
        debug!(sql, "executing SQL");
        match self.run(sql) {
            Ok(result) => {
                debug!(rows = result.row_count(), columns = result.columns.len(), "query succeeded");
                Ok(result)
            }
            Err(err) => {
                let err = ExecutionError::from(err);
                warn!(sql, error = %err, "query failed");
                Err(err)
            }
        }
    }

    fn run(&self, sql: &str) -> Result<QueryResult> {
        let mut conn = open_existing(&self.path)?;
        let tx = conn.transaction()?;

        let result = {
            let mut batch = Batch::new(&tx, sql);
            let mut stmt = batch.next()?.ok_or(StoreError::EmptyStatement)?;
            if batch.next()?.is_some() {
                return Err(StoreError::MultipleStatements);
            }

            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let column_count = columns.len();

            let mut rows = Vec::new();
            let mut cursor = stmt.query([])?;
            while let Some(row) = cursor.next()? {
                let values = (0..column_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows.push(Row::new(values));
            }

            QueryResult { columns, rows }
        };

        // Committed even for read-only statements.
        tx.commit()?;
        Ok(result)
    }
}
