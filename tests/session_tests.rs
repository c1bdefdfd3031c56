use std::path::PathBuf;

use askcsv::present::{render_json, NO_DATA_MESSAGE};
use askcsv::storage::csv::CsvReader;
use askcsv::{
    Chart, ChartKind, SchemaPrompt, Session, SessionContext, SessionError, StoreError,
    TranslateError, Value, View,
};
use tempfile::TempDir;

type Fixed = fn(&str, &SchemaPrompt) -> Result<String, TranslateError>;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)
}

fn count_translator(_: &str, _: &SchemaPrompt) -> Result<String, TranslateError> {
    Ok("SELECT COUNT(*) FROM data;".to_string())
}

fn houses_session(dir: &TempDir, translator: Fixed) -> Session<Fixed> {
    let ctx = SessionContext::new(dir.path().join("uploaded_data.db"));
    let mut session = Session::new(ctx, translator);
    session
        .ingest_csv(&sample("houses.csv"), &CsvReader::new())
        .expect("Failed to ingest houses.csv");
    session
}

#[test]
fn test_count_question_end_to_end() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let answer = session.ask("How many entries are present?").unwrap();
    assert_eq!(answer.question.as_deref(), Some("How many entries are present?"));
    assert_eq!(answer.sql, "SELECT COUNT(*) FROM data;");

    let result = answer.outcome.as_ref().unwrap();
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows[0].values, vec![Value::Integer(10)]);

    let table = answer.view.table().expect("expected a table view");
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.column_count(), 1);
    assert!(table.has_chart_options());

    for kind in ChartKind::ALL {
        let chart = table.default_chart(kind).unwrap();
        assert_eq!(chart.kind(), kind);
    }
}

#[test]
fn test_prompt_lists_csv_columns() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let prompt = session.prompt().unwrap();
    assert_eq!(prompt.table_name(), "data");
    assert_eq!(
        prompt.columns(),
        ["id", "price", "bedrooms", "bathrooms", "sqft_living", "city"]
    );
    assert!(prompt.text().contains("sqft_living"));
}

#[test]
fn test_failure_and_empty_result_are_distinguishable() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let failed = session.run_sql("SELECT nonexistent_column FROM data");
    let empty = session.run_sql("SELECT price FROM data WHERE price < 0");

    assert!(failed.outcome.is_err());
    assert!(empty.outcome.as_ref().unwrap().is_empty());

    let failed_message = failed.view.message().unwrap();
    let empty_message = empty.view.message().unwrap();
    assert!(failed_message.starts_with("Query failed"));
    assert!(failed_message.contains("nonexistent_column"));
    assert_eq!(empty_message, NO_DATA_MESSAGE);
    assert_ne!(failed_message, empty_message);
}

#[test]
fn test_malformed_generated_sql_is_an_answer_not_an_error() {
    let dir = TempDir::new().unwrap();
    let garbled: Fixed = |_, _| Ok("I'm sorry, I cannot answer that.".to_string());
    let session = houses_session(&dir, garbled);

    let answer = session.ask("Who is the best?").unwrap();
    assert!(answer.outcome.is_err());
    assert!(matches!(answer.view, View::NoData { error: Some(_) }));
}

#[test]
fn test_histogram_covers_every_value() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let answer = session.run_sql("SELECT price, city FROM data");
    let table = answer.view.table().unwrap();
    assert_eq!(table.numeric_column_names(), ["price"]);

    match table.chart(ChartKind::Histogram, "price").unwrap() {
        Chart::Histogram { column, buckets } => {
            assert_eq!(column, "price");
            assert_eq!(buckets.len(), 10);
            assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 10);
            assert_eq!(buckets[0].lower, 180000.0);
            assert_eq!(buckets[9].upper, 1225000.0);
        }
        other => panic!("expected histogram, got {:?}", other),
    }
}

#[test]
fn test_histogram_refuses_infinite_values() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let answer = session.run_sql("SELECT price FROM data UNION ALL SELECT 1e999");
    let table = answer.view.table().unwrap();
    assert_eq!(table.row_count(), 11);

    let warning = table.chart(ChartKind::Histogram, "price").unwrap_err();
    assert_eq!(
        warning.to_string(),
        "Column 'price' holds infinite values and cannot be binned."
    );
}

#[test]
fn test_text_column_is_not_chartable() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let answer = session.run_sql("SELECT city FROM data");
    let table = answer.view.table().unwrap();
    assert!(!table.has_chart_options());
    assert_eq!(
        table.default_chart(ChartKind::Bar).unwrap_err().to_string(),
        "No numerical columns found for visualization."
    );
}

#[test]
fn test_all_null_column_warns_empty() {
    let dir = TempDir::new().unwrap();
    let session = houses_session(&dir, count_translator);

    let answer = session.run_sql("SELECT NULL AS missing FROM data");
    let table = answer.view.table().unwrap();
    let warning = table.chart(ChartKind::Line, "missing").unwrap_err();
    assert_eq!(warning.to_string(), "Selected column is empty.");
}

#[test]
fn test_manual_rows_are_queryable() {
    let dir = TempDir::new().unwrap();
    let mut session = houses_session(&dir, count_translator);

    let rows = [
        ["1", "999999", "5", "3.5", "4000", "Bellevue"],
        ["2", "100000", "1", "1", "", "Tacoma"],
    ];
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    let added = session.append_rows(rows).unwrap();
    assert_eq!(added, 2);

    let answer = session.ask("How many entries are present?").unwrap();
    let result = answer.outcome.unwrap();
    assert_eq!(result.rows[0].values, vec![Value::Integer(12)]);

    let answer = session.run_sql("SELECT city, sqft_living FROM data WHERE id = 2");
    let json = render_json(answer.view.table().unwrap()).unwrap();
    assert_eq!(json, r#"[{"city":"Tacoma","sqft_living":null}]"#);
}

#[test]
fn test_reingest_replaces_previous_table() {
    let dir = TempDir::new().unwrap();
    let mut session = houses_session(&dir, count_translator);

    let people = dir.path().join("people.csv");
    std::fs::write(&people, "name,age\nAlice,30\nBob,25\n").unwrap();
    session.ingest_csv(&people, &CsvReader::new()).unwrap();

    let answer = session.ask("How many entries are present?").unwrap();
    assert_eq!(answer.outcome.unwrap().rows[0].values, vec![Value::Integer(2)]);
    assert_eq!(session.prompt().unwrap().columns(), ["name", "age"]);
}

#[test]
fn test_delete_on_close_removes_store() {
    let dir = TempDir::new().unwrap();
    let mut session = houses_session(&dir, count_translator);
    session.set_delete_on_close(true);

    assert!(session.close().unwrap());
    assert!(!session.store().exists());
    assert!(matches!(
        session.store().read_table(),
        Err(StoreError::StoreMissing(_))
    ));

    let answer = session.run_sql("SELECT COUNT(*) FROM data");
    assert!(answer.outcome.is_err());
    assert!(matches!(session.ask("How many?"), Err(SessionError::EmptyInput(_))));
}

#[test]
fn test_store_survives_close_without_flag() {
    let dir = TempDir::new().unwrap();
    let mut session = houses_session(&dir, count_translator);

    assert!(!session.close().unwrap());
    assert_eq!(session.store().row_count().unwrap(), 10);
}
