use serde_json::{Map, Number, Value as JsonValue};

use crate::storage::table::Value;

use super::chart::Chart;
use super::view::{TableView, View};

const BAR_WIDTH: usize = 40;

/// Plain-text rendering of a view for terminal output.
pub fn render_view(view: &View) -> String {
    match view {
        View::Table(table) => render_table(table),
        no_data => no_data.message().unwrap_or_default(),
    }
}

pub fn render_table(table: &TableView) -> String {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let max_value_width = table
                .rows
                .iter()
                .map(|row| row.get(i).map(|v| v.to_string().chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            name.chars().count().max(max_value_width)
        })
        .collect();

    let mut lines = Vec::with_capacity(table.row_count() + 3);

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &width)| format!("{:width$}", name, width = width))
        .collect();
    lines.push(header.join(" | "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    lines.push(sep.join("-+-"));

    for row in &table.rows {
        let values: Vec<String> = row
            .values
            .iter()
            .zip(&widths)
            .map(|(v, &width)| format!("{:width$}", v.to_string(), width = width))
            .collect();
        lines.push(values.join(" | "));
    }

    let plural = if table.row_count() == 1 { "row" } else { "rows" };
    lines.push(format!("({} {})", table.row_count(), plural));
    lines.join("\n")
}

pub fn render_csv(table: &TableView) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.values.iter().map(|v| match v {
            Value::Null => String::new(),
            other => other.to_string(),
        }))?;
    }
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_json(table: &TableView) -> Result<String, serde_json::Error> {
    let records: Vec<JsonValue> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, JsonValue> = table
                .columns
                .iter()
                .cloned()
                .zip(row.values.iter().map(value_to_json))
                .collect();
            JsonValue::Object(object)
        })
        .collect();
    serde_json::to_string(&records)
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(n) => JsonValue::from(*n),
        Value::Float(f) => Number::from_f64(*f).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
    }
}

/// Horizontal text bars for a chart.
pub fn render_chart(chart: &Chart) -> String {
    let rows: Vec<(String, f64)> = match chart {
        Chart::Bar { points, .. } | Chart::Line { points, .. } => points
            .iter()
            .map(|(i, v)| (i.to_string(), *v))
            .collect(),
        Chart::Histogram { buckets, .. } => buckets
            .iter()
            .map(|b| (format!("[{:.2}, {:.2})", b.lower, b.upper), b.count as f64))
            .collect(),
    };

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let peak = rows.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);

    let mut lines = vec![format!("{} of {}", chart.kind().label(), chart.column())];
    for (label, value) in rows {
        let len = if peak > 0.0 {
            ((value.abs() / peak) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        lines.push(format!(
            "{:>width$} | {} {}",
            label,
            "█".repeat(len),
            value,
            width = label_width
        ));
    }
    lines.join("\n")
}
