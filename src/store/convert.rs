use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::storage::table::Value;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Null => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Float(v),
            ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(_) => Value::Text("[BLOB]".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_value_survives_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        let values = [
            Value::Integer(7),
            Value::Float(1.25),
            Value::Text("seven".to_string()),
            Value::Null,
        ];

        for value in &values {
            let back: Value = conn
                .query_row("SELECT ?1", [value], |row| row.get(0))
                .unwrap();
            assert_eq!(&back, value);
        }
    }

    #[test]
    fn test_blob_is_rendered_as_placeholder() {
        let conn = Connection::open_in_memory().unwrap();
        let back: Value = conn
            .query_row("SELECT x'00ff'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(back, Value::Text("[BLOB]".to_string()));
    }
}
