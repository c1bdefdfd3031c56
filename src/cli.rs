use clap::Parser;
use std::path::PathBuf;

use crate::present::ChartKind;

#[derive(Parser, Debug)]
#[command(name = "askcsv")]
#[command(author, version, about = "Ask natural-language questions about a CSV file")]
pub struct Cli {
    /// CSV file to load into the store (the TUI can load one later with :load)
    pub path: Option<PathBuf>,

    /// Store file path [env: ASKCSV_DB] [default: uploaded_data.db]
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Ask a question and print the answer (non-interactive mode)
    #[arg(short, long, conflicts_with = "sql")]
    pub question: Option<String>,

    /// Run SQL directly against the store (non-interactive mode)
    #[arg(long)]
    pub sql: Option<String>,

    /// Output format for non-interactive mode
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Chart to print after the result table
    #[arg(long)]
    pub chart: Option<ChartKind>,

    /// Numeric column to chart (defaults to the first numeric column)
    #[arg(long, requires = "chart")]
    pub column: Option<String>,

    /// Append a row of comma-separated values after loading (repeatable)
    #[arg(long = "add-row", value_name = "VALUES")]
    pub add_rows: Vec<String>,

    /// Delete the store file when the program exits
    #[arg(long)]
    pub delete_on_close: bool,

    /// Execute translator output without stripping code fences or dialect tags
    #[arg(long)]
    pub raw_sql: bool,

    /// CSV delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,

    /// Treat the first CSV line as data
    #[arg(long)]
    pub no_header: bool,

    /// Translator model [env: GEMINI_MODEL] [default: gemini-pro]
    #[arg(long)]
    pub model: Option<String>,

    /// Write logs to this file (the TUI logs nowhere otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn is_headless(&self) -> bool {
        self.question.is_some() || self.sql.is_some()
    }

    /// Splits each `--add-row` value into one field per column.
    pub fn manual_rows(&self) -> Vec<Vec<String>> {
        self.add_rows
            .iter()
            .map(|row| row.split(self.delimiter).map(|v| v.trim().to_string()).collect())
            .collect()
    }
}
