use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::present::{present, View};
use crate::storage::csv::{CsvError, CsvReader};
use crate::storage::table::{Row, Table, Value};
use crate::store::{
    sanitize_generated_sql, ExecutionError, LoadMode, QueryExecutor, QueryResult, StoreError,
    TableStore, TABLE_NAME,
};
use crate::translate::{SchemaPrompt, TranslateError, Translator};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("Please upload a CSV file first ({0})")]
    EmptyInput(String),
}

/// Per-session settings. One session owns one store file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub store_path: PathBuf,
    /// Remove the store file when the session is closed.
    pub delete_on_close: bool,
    /// Strip formatting artifacts from translator output before executing it.
    pub sanitize: bool,
}

impl SessionContext {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            delete_on_close: false,
            sanitize: true,
        }
    }

    pub fn with_delete_on_close(mut self, delete_on_close: bool) -> Self {
        self.delete_on_close = delete_on_close;
        self
    }

    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }
}

/// Result of one question or raw query.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: Option<String>,
    /// Text as the translator returned it.
    pub raw_sql: String,
    /// Text that was executed.
    pub sql: String,
    pub outcome: Result<QueryResult, ExecutionError>,
    pub view: View,
}

pub struct Session<T> {
    ctx: SessionContext,
    translator: T,
    store: TableStore,
    executor: QueryExecutor,
    table: Option<Table>,
    prompt: Option<SchemaPrompt>,
}

impl<T: Translator> Session<T> {
    pub fn new(ctx: SessionContext, translator: T) -> Self {
        let store = TableStore::new(&ctx.store_path);
        let executor = QueryExecutor::new(&ctx.store_path);
        Self {
            ctx,
            translator,
            store,
            executor,
            table: None,
            prompt: None,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// The most recently ingested table, including manually appended rows.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn prompt(&self) -> Option<&SchemaPrompt> {
        self.prompt.as_ref()
    }

    pub fn delete_on_close(&self) -> bool {
        self.ctx.delete_on_close
    }

    pub fn set_delete_on_close(&mut self, delete_on_close: bool) {
        self.ctx.delete_on_close = delete_on_close;
    }

    pub fn ingest_csv(&mut self, path: &Path, reader: &CsvReader) -> Result<&Table, SessionError> {
        let table = reader.read_file(path)?;
        info!(path = %path.display(), rows = table.row_count(), "read CSV file");
        self.ingest_table(table)
    }

    /// Replaces the store contents with `table`.
    pub fn ingest_table(&mut self, table: Table) -> Result<&Table, SessionError> {
        self.store.load(&table, LoadMode::Replace)?;
        self.prompt = Some(SchemaPrompt::for_table(TABLE_NAME, &table.schema.column_names()));
        Ok(self.table.insert(table))
    }

    /// Translates, executes and presents a question.
    ///
    /// Translator failures are returned as errors; execution failures are
    /// part of the answer.
    pub fn ask(&self, question: &str) -> Result<Answer, SessionError> {
        let prompt = self
            .prompt
            .as_ref()
            .ok_or_else(|| SessionError::EmptyInput("no table loaded".to_string()))?;
        if question.trim().is_empty() {
            return Err(SessionError::EmptyInput("question is empty".to_string()));
        }

        let raw_sql = self.translator.translate(question, prompt)?;
        let sql = if self.ctx.sanitize {
            sanitize_generated_sql(&raw_sql)
        } else {
            raw_sql.clone()
        };
        info!(question, sql = %sql, "translated question");

        let mut answer = self.run_sql(&sql);
        answer.question = Some(question.to_string());
        answer.raw_sql = raw_sql;
        Ok(answer)
    }

    /// Executes SQL text as-is and presents the outcome.
    pub fn run_sql(&self, sql: &str) -> Answer {
        let outcome = self.executor.execute(sql);
        let view = present(&outcome);
        Answer {
            question: None,
            raw_sql: sql.to_string(),
            sql: sql.to_string(),
            outcome,
            view,
        }
    }

    /// Appends manually entered rows, one text value per column per row.
    pub fn append_rows(&mut self, rows: Vec<Vec<String>>) -> Result<usize, SessionError> {
        let table = self
            .table
            .as_mut()
            .ok_or_else(|| SessionError::EmptyInput("no table to add rows to".to_string()))?;
        if rows.is_empty() {
            return Err(SessionError::EmptyInput("no rows entered".to_string()));
        }

        let rows: Vec<Row> = rows
            .iter()
            .map(|values| Row::new(values.iter().map(|v| Value::parse_scalar(v)).collect()))
            .collect();
        let batch = Table::with_rows(TABLE_NAME, table.schema.clone(), rows);

        let written = self.store.load(&batch, LoadMode::Append)?;
        // Column affinity may have converted cells; keep what the store holds.
        table.rows = self.store.read_table()?.rows;
        Ok(written)
    }

    /// Ends the session. Removes the store file when delete-on-close is
    /// set and reports whether it did.
    pub fn close(&mut self) -> Result<bool, SessionError> {
        self.table = None;
        self.prompt = None;

        if !self.ctx.delete_on_close {
            return Ok(false);
        }
        if let Err(err) = self.store.remove() {
            warn!(path = %self.store.path().display(), error = %err, "could not remove store file");
            return Err(err.into());
        }
        Ok(true)
    }
}
