mod adapter;
mod convert;
mod error;
mod executor;
mod sanitize;

pub use adapter::{LoadMode, TableStore, TABLE_NAME};
pub use error::{Result, StoreError};
pub use executor::{ExecutionError, QueryExecutor, QueryResult};
pub use sanitize::sanitize_generated_sql;
