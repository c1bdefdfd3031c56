use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::storage::table::{Column, DataType, Row, Schema, Table, Value};

use super::error::{Result, StoreError};

/// Name of the single table the store holds.
pub const TABLE_NAME: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Replace,
    Append,
}

/// Single-file SQLite store mirroring the most recently ingested table.
///
/// Every call opens its own connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes `table` into the store and returns the number of rows written.
    pub fn load(&self, table: &Table, mode: LoadMode) -> Result<usize> {
        match mode {
            LoadMode::Replace => self.replace(table),
            LoadMode::Append => self.append(table),
        }
    }

    fn replace(&self, table: &Table) -> Result<usize> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;

        let column_defs: Vec<String> = table
            .schema
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.data_type.sql_type()))
            .collect();

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({cols});",
            name = quote_ident(TABLE_NAME),
            cols = column_defs.join(", "),
        ))?;

        let written = insert_rows(&tx, &table.schema, &table.rows)?;
        tx.commit()?;

        info!(
            path = %self.path.display(),
            columns = table.column_count(),
            rows = written,
            "replaced store table"
        );
        Ok(written)
    }

    fn append(&self, table: &Table) -> Result<usize> {
        let mut conn = open_existing(&self.path)?;
        let stored = read_schema(&conn)?;

        if !stored.same_column_set(&table.schema) {
            return Err(StoreError::SchemaMismatch {
                expected: stored.column_names().iter().map(|s| s.to_string()).collect(),
                found: table.schema.column_names().iter().map(|s| s.to_string()).collect(),
            });
        }

        let tx = conn.transaction()?;
        let written = insert_rows(&tx, &table.schema, &table.rows)?;
        tx.commit()?;

        info!(path = %self.path.display(), rows = written, "appended rows to store table");
        Ok(written)
    }

    /// Schema of the stored `data` table.
    pub fn schema(&self) -> Result<Schema> {
        let conn = open_existing(&self.path)?;
        read_schema(&conn)
    }

    /// Reads every stored row back in insertion order.
    pub fn read_table(&self) -> Result<Table> {
        let conn = open_existing(&self.path)?;
        let schema = read_schema(&conn)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} ORDER BY rowid",
            quote_ident(TABLE_NAME)
        ))?;
        let column_count = stmt.column_count();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let values = (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.push(Row::new(values));
        }

        Ok(Table::with_rows(TABLE_NAME, schema, rows))
    }

    pub fn row_count(&self) -> Result<usize> {
        let conn = open_existing(&self.path)?;
        read_schema(&conn)?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(TABLE_NAME)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Deletes the store file.
    pub fn remove(&self) -> Result<()> {
        fs::remove_file(&self.path)?;
        info!(path = %self.path.display(), "removed store file");
        Ok(())
    }
}

/// Opens an existing store file; never creates one.
pub(crate) fn open_existing(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(StoreError::StoreMissing(path.to_path_buf()));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
    )?;
    debug!(path = %path.display(), "opened store connection");
    Ok(conn)
}

fn read_schema(conn: &Connection) -> Result<Schema> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(TABLE_NAME)))?;

    let columns: Vec<Column> = stmt
        .query_map([], |row| {
            let name: String = row.get(1)?;
            let type_name: String = row.get(2)?;
            Ok(Column::new(name, DataType::from_sql_type(&type_name)))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(StoreError::EmptyInput(format!(
            "table '{}' does not exist",
            TABLE_NAME
        )));
    }

    Ok(Schema::new(columns))
}

fn insert_rows(conn: &Connection, schema: &Schema, rows: &[Row]) -> Result<usize> {
    let expected = schema.column_count();
    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.values.len() != expected)
    {
        return Err(StoreError::RowWidth {
            row: index + 1,
            expected,
            found: row.values.len(),
        });
    }

    let names: Vec<String> = schema.columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders: Vec<String> = (1..=expected).map(|i| format!("?{}", i)).collect();
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(TABLE_NAME),
        names.join(", "),
        placeholders.join(", "),
    ))?;

    for row in rows {
        stmt.execute(params_from_iter(row.values.iter()))?;
    }

    Ok(rows.len())
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn houses() -> Table {
        let schema = Schema::new(vec![
            Column::new("price", DataType::Integer),
            Column::new("sqft_living", DataType::Float),
            Column::new("city", DataType::Text),
        ]);
        Table::with_rows(
            "houses",
            schema,
            vec![
                Row::new(vec![Value::Integer(221900), Value::Float(1180.0), Value::Text("Seattle".into())]),
                Row::new(vec![Value::Integer(538000), Value::Null, Value::Text("Kent".into())]),
            ],
        )
    }

    fn store_in(dir: &TempDir) -> TableStore {
        TableStore::new(dir.path().join("store.db"))
    }

    #[test]
    fn test_replace_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let table = houses();

        assert_eq!(store.load(&table, LoadMode::Replace).unwrap(), 2);

        let back = store.read_table().unwrap();
        assert_eq!(back.name, TABLE_NAME);
        assert_eq!(back.schema, table.schema);
        assert_eq!(back.rows, table.rows);
    }

    #[test]
    fn test_replace_discards_previous_schema() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.load(&houses(), LoadMode::Replace).unwrap();

        let other = Table::with_rows(
            "other",
            Schema::new(vec![Column::new("id", DataType::Integer)]),
            vec![Row::new(vec![Value::Integer(1)])],
        );
        store.load(&other, LoadMode::Replace).unwrap();

        assert_eq!(store.schema().unwrap().column_names(), vec!["id"]);
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[test]
    fn test_append_matching_columns_in_any_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.load(&houses(), LoadMode::Replace).unwrap();

        let extra = Table::with_rows(
            "extra",
            Schema::new(vec![
                Column::new("city", DataType::Text),
                Column::new("price", DataType::Integer),
                Column::new("sqft_living", DataType::Float),
            ]),
            vec![Row::new(vec![Value::Text("Renton".into()), Value::Integer(180000), Value::Float(770.0)])],
        );
        assert_eq!(store.load(&extra, LoadMode::Append).unwrap(), 1);

        let back = store.read_table().unwrap();
        assert_eq!(back.row_count(), 3);
        assert_eq!(
            back.rows[2].values,
            vec![Value::Integer(180000), Value::Float(770.0), Value::Text("Renton".into())]
        );
    }

    #[test]
    fn test_append_mismatch_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.load(&houses(), LoadMode::Replace).unwrap();

        let wrong = Table::with_rows(
            "wrong",
            Schema::new(vec![Column::new("bedrooms", DataType::Integer)]),
            vec![Row::new(vec![Value::Integer(3)])],
        );
        let err = store.load(&wrong, LoadMode::Append).unwrap_err();

        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        assert_eq!(store.row_count().unwrap(), 2);
    }

    #[test]
    fn test_append_duplicate_column_names_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let two_columns = Table::with_rows(
            "two",
            Schema::new(vec![
                Column::new("price", DataType::Integer),
                Column::new("city", DataType::Text),
            ]),
            vec![Row::new(vec![Value::Integer(221900), Value::Text("Seattle".into())])],
        );
        store.load(&two_columns, LoadMode::Replace).unwrap();

        let doubled = Table::with_rows(
            "doubled",
            Schema::new(vec![
                Column::new("price", DataType::Integer),
                Column::new("PRICE", DataType::Integer),
            ]),
            vec![Row::new(vec![Value::Integer(1), Value::Integer(2)])],
        );
        let err = store.load(&doubled, LoadMode::Append).unwrap_err();

        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[test]
    fn test_append_short_row_rolls_back() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let table = houses();
        store.load(&table, LoadMode::Replace).unwrap();

        let bad = Table::with_rows(
            "bad",
            table.schema.clone(),
            vec![
                Row::new(vec![Value::Integer(1), Value::Float(2.0), Value::Text("ok".into())]),
                Row::new(vec![Value::Integer(1)]),
            ],
        );
        let err = store.load(&bad, LoadMode::Append).unwrap_err();

        assert!(matches!(err, StoreError::RowWidth { row: 2, expected: 3, found: 1 }));
        assert_eq!(store.row_count().unwrap(), 2);
    }

    #[test]
    fn test_append_without_store_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.load(&houses(), LoadMode::Append).unwrap_err();
        assert!(matches!(err, StoreError::StoreMissing(_)));
        assert!(!store.exists());
    }

    #[test]
    fn test_append_without_table() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        Connection::open(store.path()).unwrap();

        let err = store.load(&houses(), LoadMode::Append).unwrap_err();
        assert!(matches!(err, StoreError::EmptyInput(_)));
    }

    #[test]
    fn test_remove_then_access_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.load(&houses(), LoadMode::Replace).unwrap();

        store.remove().unwrap();

        assert!(matches!(store.read_table(), Err(StoreError::StoreMissing(_))));
        assert!(matches!(store.remove(), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("price"), "\"price\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
