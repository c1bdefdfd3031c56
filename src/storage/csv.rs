use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::table::{is_null_token, Column, DataType, Row, Schema, Table, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Line {line} has {found} fields, expected {expected}")]
    Ragged {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(char),
    #[error("Empty CSV file")]
    EmptyFile,
}

pub struct CsvReader {
    delimiter: char,
    has_header: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn read_file(&self, path: &Path) -> Result<Table, CsvError> {
        let file = File::open(path)?;
        let table_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();

        self.read_from_reader(file, &table_name)
    }

    pub fn read_from_reader<R: Read>(&self, reader: R, table_name: &str) -> Result<Table, CsvError> {
        if !self.delimiter.is_ascii() {
            return Err(CsvError::Delimiter(self.delimiter));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter as u8)
            .has_headers(self.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header_row: Option<Vec<String>> = if self.has_header {
            let header = reader.headers()?;
            if header.is_empty() {
                return Err(CsvError::EmptyFile);
            }
            Some(header.iter().map(str::to_string).collect())
        } else {
            None
        };

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        let mut records = reader.records();

        let headers: Vec<String> = if let Some(headers) = header_row {
            headers
        } else {
            let first = records.next().ok_or(CsvError::EmptyFile)??;
            let headers = (0..first.len()).map(|i| format!("column{}", i + 1)).collect();
            raw_rows.push(first.iter().map(str::to_string).collect());
            headers
        };

        for record in records {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            if record.len() != headers.len() {
                return Err(CsvError::Ragged {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            raw_rows.push(record.iter().map(str::to_string).collect());
        }

        let types = self.infer_types(&raw_rows, headers.len());

        let columns: Vec<Column> = headers
            .iter()
            .zip(types.iter())
            .map(|(name, dtype)| Column::new(name.clone(), *dtype))
            .collect();
        let schema = Schema::new(columns);

        let rows: Vec<Row> = raw_rows
            .iter()
            .map(|raw_row| {
                let values: Vec<Value> = raw_row
                    .iter()
                    .zip(types.iter())
                    .map(|(s, dtype)| self.parse_value(s, dtype))
                    .collect();
                Row::new(values)
            })
            .collect();

        Ok(Table::with_rows(table_name, schema, rows))
    }

    fn infer_types(&self, rows: &[Vec<String>], num_columns: usize) -> Vec<DataType> {
        let mut types = vec![DataType::Null; num_columns];

        for row in rows {
            for (i, value) in row.iter().enumerate().take(num_columns) {
                let inferred = Value::parse_scalar(value).data_type();
                types[i] = self.merge_types(types[i], inferred);
            }
        }

        for dtype in &mut types {
            if *dtype == DataType::Null {
                *dtype = DataType::Text;
            }
        }

        types
    }

    fn merge_types(&self, current: DataType, new: DataType) -> DataType {
        match (current, new) {
            (DataType::Null, other) | (other, DataType::Null) => other,
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => DataType::Float,
            (a, b) if a == b => a,
            _ => DataType::Text,
        }
    }

    fn parse_value(&self, value: &str, dtype: &DataType) -> Value {
        if is_null_token(value) {
            return Value::Null;
        }

        match dtype {
            DataType::Integer => value.parse::<i64>().map(Value::Integer).unwrap_or(Value::Null),
            DataType::Float => value.parse::<f64>().map(Value::Float).unwrap_or(Value::Null),
            DataType::Text => Value::Text(value.to_string()),
            DataType::Null => Value::Null,
        }
    }
}
