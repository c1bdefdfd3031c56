pub mod table;
pub mod csv;

pub use self::table::{Table, DataType, Value, Schema, Column, Row};
pub use self::csv::{CsvReader, CsvError};
