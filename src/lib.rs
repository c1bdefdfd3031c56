pub mod cli;
pub mod config;
pub mod logging;
pub mod present;
pub mod session;
pub mod storage;
pub mod store;
pub mod translate;
pub mod tui;

pub use config::Config;
pub use present::{present, Chart, ChartKind, TableView, View};
pub use session::{Answer, Session, SessionContext, SessionError};
pub use storage::table::{Column, DataType, Row, Schema, Table, Value};
pub use store::{ExecutionError, LoadMode, QueryExecutor, QueryResult, StoreError, TableStore};
pub use translate::{GeminiClient, SchemaPrompt, TranslateError, Translator};
