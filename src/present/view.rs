use crate::storage::table::{Row, Value};
use crate::store::{ExecutionError, QueryResult};

use super::chart::{Chart, ChartKind, VisualizationUnavailable};

pub const NO_DATA_MESSAGE: &str = "No data retrieved from the database.";

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Nothing to show. `error` is set when the query failed and empty when
    /// it succeeded with zero rows.
    NoData { error: Option<String> },
    Table(TableView),
}

impl View {
    pub fn is_no_data(&self) -> bool {
        matches!(self, View::NoData { .. })
    }

    /// User-facing message for the "no data" cases.
    pub fn message(&self) -> Option<String> {
        match self {
            View::NoData { error: Some(error) } => Some(format!("Query failed: {}", error)),
            View::NoData { error: None } => Some(NO_DATA_MESSAGE.to_string()),
            View::Table(_) => None,
        }
    }

    pub fn table(&self) -> Option<&TableView> {
        match self {
            View::Table(table) => Some(table),
            View::NoData { .. } => None,
        }
    }
}

/// Converts an execution outcome into something to display.
pub fn present(outcome: &Result<QueryResult, ExecutionError>) -> View {
    match outcome {
        Err(err) => View::NoData {
            error: Some(err.message.clone()),
        },
        Ok(result) if result.is_empty() => View::NoData { error: None },
        Ok(result) => View::Table(TableView::from_result(result)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Indexes of columns eligible for charting.
    pub numeric_columns: Vec<usize>,
}

impl TableView {
    pub fn from_result(result: &QueryResult) -> Self {
        // A column is numeric when none of its values is text. Columns of
        // only NULLs qualify and report as empty when charted.
        let numeric_columns = (0..result.columns.len())
            .filter(|&i| result.column_values(i).all(|v| v.is_numeric() || v.is_null()))
            .collect();

        Self {
            columns: result.columns.clone(),
            rows: result.rows.clone(),
            numeric_columns,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.numeric_columns
            .iter()
            .map(|&i| self.columns[i].as_str())
            .collect()
    }

    pub fn has_chart_options(&self) -> bool {
        !self.numeric_columns.is_empty()
    }

    fn numeric_index(&self, column: &str) -> Option<usize> {
        let exact = self
            .numeric_columns
            .iter()
            .copied()
            .find(|&i| self.columns[i] == column);
        exact.or_else(|| {
            self.numeric_columns
                .iter()
                .copied()
                .find(|&i| self.columns[i].eq_ignore_ascii_case(column))
        })
    }

    pub fn chart(&self, kind: ChartKind, column: &str) -> Result<Chart, VisualizationUnavailable> {
        if !self.has_chart_options() {
            return Err(VisualizationUnavailable::NoNumericColumns);
        }
        let index = self
            .numeric_index(column)
            .ok_or_else(|| VisualizationUnavailable::UnknownColumn(column.to_string()))?;

        let points: Vec<(usize, f64)> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(index).and_then(Value::as_float).map(|v| (i, v)))
            .collect();

        Chart::build(kind, &self.columns[index], points)
    }

    /// Chart of the first numeric column.
    pub fn default_chart(&self, kind: ChartKind) -> Result<Chart, VisualizationUnavailable> {
        match self.numeric_columns.first() {
            Some(&i) => self.chart(kind, &self.columns[i]),
            None => Err(VisualizationUnavailable::NoNumericColumns),
        }
    }
}
