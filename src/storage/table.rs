use std::collections::{BTreeSet, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Null,
}

impl DataType {
    /// Declared column type used when the table is written to SQLite.
    pub fn sql_type(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Float => "REAL",
            DataType::Text | DataType::Null => "TEXT",
        }
    }

    /// Maps a declared SQLite column type back onto a semantic type.
    pub fn from_sql_type(decl: &str) -> Self {
        match decl.to_uppercase().as_str() {
            t if t.contains("INT") => DataType::Integer,
            t if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") => DataType::Float,
            "" => DataType::Null,
            _ => DataType::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// Resolves a raw text cell into a tagged scalar.
    pub fn parse_scalar(raw: &str) -> Self {
        let raw = raw.trim();
        if is_null_token(raw) {
            return Value::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Text(raw.to_string())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Text(_) => DataType::Text,
            Value::Null => DataType::Null,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }
}

pub(crate) fn is_null_token(raw: &str) -> bool {
    raw.is_empty()
        || raw.eq_ignore_ascii_case("null")
        || raw.eq_ignore_ascii_case("na")
        || raw.eq_ignore_ascii_case("n/a")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "NULL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub columns: Vec<Column>,
    column_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_lowercase(), i))
            .collect();
        Self {
            columns,
            column_index,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(&name.to_lowercase()).copied()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Lowercased column names, or `None` when two columns collide.
    fn name_set(&self) -> Option<BTreeSet<String>> {
        let names: BTreeSet<String> = self.columns.iter().map(|c| c.name.to_lowercase()).collect();
        (names.len() == self.columns.len()).then_some(names)
    }

    /// True when both schemas name the same distinct columns, ignoring order
    /// and case. A schema with duplicate names matches nothing.
    pub fn same_column_set(&self, other: &Schema) -> bool {
        match (self.name_set(), other.name_set()) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// The semantic table: fixed, ordered columns and rows that all share them.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn with_rows(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            schema,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }
}
