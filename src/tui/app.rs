use std::path::Path;

use crate::present::{Chart, ChartKind, TableView, View, VisualizationUnavailable};
use crate::session::{Answer, Session};
use crate::storage::csv::CsvReader;
use crate::translate::Translator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,
    Insert,
    Command,
    RowEntry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Question,
    Results,
}

/// Upper bound on rows entered through one form.
pub const MAX_FORM_ROWS: usize = 50;

/// Manual row entry: one text field per column per requested row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowForm {
    pub columns: Vec<String>,
    pub values: Vec<Vec<String>>,
    pub field: usize,
}

impl RowForm {
    pub fn new(columns: Vec<String>, rows: usize) -> Self {
        let values = vec![vec![String::new(); columns.len()]; rows.clamp(1, MAX_FORM_ROWS)];
        Self {
            columns,
            values,
            field: 0,
        }
    }

    pub fn field_count(&self) -> usize {
        self.values.len() * self.columns.len()
    }

    /// `(row, column)` of the focused field.
    pub fn position(&self) -> (usize, usize) {
        let width = self.columns.len().max(1);
        (self.field / width, self.field % width)
    }

    pub fn current_mut(&mut self) -> Option<&mut String> {
        let (row, col) = self.position();
        self.values.get_mut(row).and_then(|r| r.get_mut(col))
    }

    pub fn next_field(&mut self) {
        if self.field_count() > 0 {
            self.field = (self.field + 1) % self.field_count();
        }
    }

    pub fn prev_field(&mut self) {
        if self.field_count() > 0 {
            self.field = (self.field + self.field_count() - 1) % self.field_count();
        }
    }

    pub fn is_last_field(&self) -> bool {
        self.field + 1 >= self.field_count()
    }
}

pub struct App<T> {
    pub question: String,
    pub cursor_pos: usize,
    pub answer: Option<Answer>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub mode: Mode,
    pub focus: Focus,
    pub should_quit: bool,
    pub session: Session<T>,
    pub csv_reader: CsvReader,
    pub command_buffer: String,
    pub result_scroll: usize,
    pub result_horizontal_scroll: usize,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
    pub column_widths: Vec<usize>,
    pub chart_kind: ChartKind,
    pub chart_column: usize,
    pub row_form: Option<RowForm>,
}

impl<T: Translator> App<T> {
    pub fn new(session: Session<T>, csv_reader: CsvReader) -> Self {
        Self {
            question: String::new(),
            cursor_pos: 0,
            answer: None,
            error: None,
            message: None,
            mode: Mode::Normal,
            focus: Focus::Question,
            should_quit: false,
            session,
            csv_reader,
            command_buffer: String::new(),
            result_scroll: 0,
            result_horizontal_scroll: 0,
            history: Vec::new(),
            history_index: None,
            column_widths: Vec::new(),
            chart_kind: ChartKind::default(),
            chart_column: 0,
            row_form: None,
        }
    }

    pub fn ask_question(&mut self) {
        if self.question.trim().is_empty() {
            return;
        }

        if self.history.last() != Some(&self.question) {
            self.history.push(self.question.clone());
        }
        self.history_index = None;

        match self.session.ask(&self.question) {
            Ok(answer) => self.show_answer(answer),
            Err(e) => {
                self.error = Some(e.to_string());
                self.answer = None;
            }
        }
    }

    pub fn run_sql(&mut self, sql: &str) {
        let answer = self.session.run_sql(sql);
        self.show_answer(answer);
    }

    fn show_answer(&mut self, answer: Answer) {
        if let View::Table(ref table) = answer.view {
            self.calculate_column_widths(table);
        } else {
            self.column_widths.clear();
        }
        self.answer = Some(answer);
        self.error = None;
        self.result_scroll = 0;
        self.result_horizontal_scroll = 0;
        self.chart_column = 0;
    }

    pub fn table_view(&self) -> Option<&TableView> {
        self.answer.as_ref().and_then(|a| a.view.table())
    }

    /// Chart for the current selection, or why there is none.
    pub fn current_chart(&self) -> Option<Result<Chart, VisualizationUnavailable>> {
        let table = self.table_view()?;
        let names = table.numeric_column_names();
        Some(match names.get(self.chart_column) {
            Some(column) => table.chart(self.chart_kind, column),
            None => Err(VisualizationUnavailable::NoNumericColumns),
        })
    }

    pub fn cycle_chart_kind(&mut self) {
        self.chart_kind = self.chart_kind.next();
    }

    pub fn cycle_chart_column(&mut self) {
        let count = self.table_view().map(|t| t.numeric_columns.len()).unwrap_or(0);
        if count > 0 {
            self.chart_column = (self.chart_column + 1) % count;
        }
    }

    pub fn load_csv(&mut self, path: &str) {
        match self.session.ingest_csv(Path::new(path), &self.csv_reader) {
            Ok(table) => {
                self.message = Some(format!(
                    "Loaded {} rows x {} columns into the store",
                    table.row_count(),
                    table.column_count()
                ));
                self.error = None;
                self.answer = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn open_row_form(&mut self, rows: usize) {
        match self.session.table() {
            Some(table) => {
                let columns = table.schema.column_names().iter().map(|c| c.to_string()).collect();
                self.row_form = Some(RowForm::new(columns, rows));
                self.mode = Mode::RowEntry;
            }
            None => {
                self.error = Some("Please upload a CSV file first to add additional data.".to_string());
            }
        }
    }

    pub fn submit_row_form(&mut self) {
        let Some(form) = self.row_form.take() else {
            return;
        };
        match self.session.append_rows(form.values) {
            Ok(count) => {
                self.message = Some(format!("Appended {} rows to the store", count));
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.mode = Mode::Normal;
    }

    pub fn cancel_row_form(&mut self) {
        self.row_form = None;
        self.mode = Mode::Normal;
    }

    pub fn toggle_delete_on_close(&mut self) {
        let flag = !self.session.delete_on_close();
        self.session.set_delete_on_close(flag);
        self.message = Some(if flag {
            "Store file will be deleted on exit".to_string()
        } else {
            "Store file will be kept on exit".to_string()
        });
    }

    fn calculate_column_widths(&mut self, table: &TableView) {
        self.column_widths = table
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
                name.chars().count().max(max_value_width).max(4)
            })
            .collect();
    }

    pub fn insert_char(&mut self, c: char) {
        self.question.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    pub fn delete_char(&mut self) {
        if let Some(c) = self.question[..self.cursor_pos].chars().next_back() {
            self.cursor_pos -= c.len_utf8();
            self.question.remove(self.cursor_pos);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_pos < self.question.len() {
            self.question.remove(self.cursor_pos);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(c) = self.question[..self.cursor_pos].chars().next_back() {
            self.cursor_pos -= c.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.question[self.cursor_pos..].chars().next() {
            self.cursor_pos += c.len_utf8();
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.question.len();
    }

    pub fn move_cursor_word_forward(&mut self) {
        let rest = &self.question[self.cursor_pos..];
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let after = &rest[word_end..];
        let next_word = after.find(|c: char| !c.is_whitespace()).unwrap_or(after.len());
        self.cursor_pos += word_end + next_word;
    }

    pub fn move_cursor_word_backward(&mut self) {
        let before = self.question[..self.cursor_pos].trim_end();
        self.cursor_pos = before
            .rfind(char::is_whitespace)
            .map(|i| i + before[i..].chars().next().map(char::len_utf8).unwrap_or(1))
            .unwrap_or(0);
    }

    pub fn delete_word_backward(&mut self) {
        let end = self.cursor_pos;
        self.move_cursor_word_backward();
        self.question.drain(self.cursor_pos..end);
    }

    pub fn delete_to_end(&mut self) {
        self.question.truncate(self.cursor_pos);
    }

    pub fn delete_to_start(&mut self) {
        self.question = self.question[self.cursor_pos..].to_string();
        self.cursor_pos = 0;
    }

    pub fn clear_question(&mut self) {
        self.question.clear();
        self.cursor_pos = 0;
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let new_index = match self.history_index {
            None => self.history.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };

        self.history_index = Some(new_index);
        self.question = self.history[new_index].clone();
        self.cursor_pos = self.question.len();
    }

    pub fn history_down(&mut self) {
        if self.history.is_empty() {
            return;
        }

        match self.history_index {
            None => {}
            Some(i) if i >= self.history.len() - 1 => {
                self.history_index = None;
                self.question.clear();
                self.cursor_pos = 0;
            }
            Some(i) => {
                self.history_index = Some(i + 1);
                self.question = self.history[i + 1].clone();
                self.cursor_pos = self.question.len();
            }
        }
    }

    fn result_rows(&self) -> usize {
        self.table_view().map(|t| t.row_count()).unwrap_or(0)
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn scroll_results_down(&mut self) {
        if self.result_scroll < self.result_rows().saturating_sub(1) {
            self.result_scroll += 1;
        }
    }

    pub fn scroll_results_left(&mut self) {
        self.result_horizontal_scroll = self.result_horizontal_scroll.saturating_sub(1);
    }

    pub fn scroll_results_right(&mut self) {
        if self.result_horizontal_scroll + 1 < self.column_widths.len() {
            self.result_horizontal_scroll += 1;
        }
    }

    pub fn page_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(10);
    }

    pub fn page_down(&mut self) {
        self.result_scroll = (self.result_scroll + 10).min(self.result_rows().saturating_sub(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.result_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.result_scroll = self.result_rows().saturating_sub(1);
    }

    pub fn enter_insert_mode(&mut self) {
        self.mode = Mode::Insert;
        self.focus = Focus::Question;
    }

    pub fn enter_normal_mode(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_buffer.clear();
    }

    pub fn execute_command(&mut self) {
        let buffer = std::mem::take(&mut self.command_buffer);
        let (cmd, arg) = match buffer.trim().split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (buffer.trim(), ""),
        };
        self.mode = Mode::Normal;

        match cmd {
            "q" | "quit" => self.should_quit = true,
            "e" | "ask" => self.ask_question(),
            "sql" if !arg.is_empty() => self.run_sql(arg),
            "load" if !arg.is_empty() => self.load_csv(arg),
            "add" => match arg {
                "" => self.open_row_form(1),
                n => match n.parse::<usize>() {
                    Ok(rows) if (1..=MAX_FORM_ROWS).contains(&rows) => self.open_row_form(rows),
                    Ok(_) => {
                        self.error = Some(format!("Row count must be between 1 and {}", MAX_FORM_ROWS))
                    }
                    _ => self.error = Some(format!("Invalid row count: {}", n)),
                },
            },
            "delete" => self.toggle_delete_on_close(),
            "clear" => {
                self.clear_question();
                self.answer = None;
                self.error = None;
                self.message = None;
            }
            "" => {}
            other => self.error = Some(format!("Unknown command: {}", other)),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Question => Focus::Results,
            Focus::Results => Focus::Question,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;
    use crate::translate::{SchemaPrompt, TranslateError};
    use std::fs;
    use tempfile::TempDir;

    type Fixed = fn(&str, &SchemaPrompt) -> Result<String, TranslateError>;

    fn count_rows(_: &str, _: &SchemaPrompt) -> Result<String, TranslateError> {
        Ok("SELECT COUNT(*) FROM data;".to_string())
    }

    fn app_with_csv(dir: &TempDir) -> App<Fixed> {
        let csv = dir.path().join("houses.csv");
        fs::write(&csv, "price,sqft_living,city\n221900,1180,Seattle\n538000,2570,Kent\n").unwrap();
        let session = Session::new(SessionContext::new(dir.path().join("s.db")), count_rows as Fixed);
        let mut app = App::new(session, CsvReader::new());
        app.load_csv(csv.to_str().unwrap());
        app
    }

    #[test]
    fn test_ask_shows_answer() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_csv(&dir);

        app.question = "How many entries are present?".to_string();
        app.ask_question();

        let table = app.table_view().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(app.history, vec!["How many entries are present?"]);
        assert!(matches!(app.current_chart(), Some(Ok(Chart::Bar { .. }))));
    }

    #[test]
    fn test_commands() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_csv(&dir);

        app.command_buffer = "sql SELECT city FROM data".to_string();
        app.execute_command();
        assert_eq!(app.table_view().unwrap().row_count(), 2);
        assert!(matches!(
            app.current_chart(),
            Some(Err(VisualizationUnavailable::NoNumericColumns))
        ));

        app.command_buffer = "delete".to_string();
        app.execute_command();
        assert!(app.session.delete_on_close());

        app.command_buffer = "bogus".to_string();
        app.execute_command();
        assert_eq!(app.error.as_deref(), Some("Unknown command: bogus"));

        app.command_buffer = "q".to_string();
        app.execute_command();
        assert!(app.should_quit);
    }

    #[test]
    fn test_row_form_appends() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_csv(&dir);

        app.command_buffer = "add 2".to_string();
        app.execute_command();
        assert_eq!(app.mode, Mode::RowEntry);

        let form = app.row_form.as_mut().unwrap();
        assert_eq!(form.field_count(), 6);
        for value in ["1", "2", "A", "3", "4", "B"] {
            form.current_mut().unwrap().push_str(value);
            form.next_field();
        }
        app.submit_row_form();

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.message.as_deref(), Some("Appended 2 rows to the store"));
        assert_eq!(app.session.store().row_count().unwrap(), 4);
    }

    #[test]
    fn test_add_row_count_is_bounded() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_csv(&dir);

        app.command_buffer = "add 18446744073709551615".to_string();
        app.execute_command();
        assert!(app.row_form.is_none());
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.error.as_deref(), Some("Row count must be between 1 and 50"));

        app.command_buffer = "add 0".to_string();
        app.execute_command();
        assert!(app.row_form.is_none());

        let form = RowForm::new(vec!["a".to_string()], usize::MAX);
        assert_eq!(form.values.len(), MAX_FORM_ROWS);
    }

    #[test]
    fn test_row_form_without_table() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(SessionContext::new(dir.path().join("s.db")), count_rows as Fixed);
        let mut app = App::new(session, CsvReader::new());

        app.open_row_form(1);
        assert!(app.row_form.is_none());
        assert!(app.error.is_some());
    }

    #[test]
    fn test_chart_cycling() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_csv(&dir);
        app.run_sql("SELECT price, sqft_living FROM data");

        app.cycle_chart_kind();
        app.cycle_chart_column();
        match app.current_chart() {
            Some(Ok(chart)) => {
                assert_eq!(chart.kind(), ChartKind::Line);
                assert_eq!(chart.column(), "sqft_living");
            }
            other => panic!("unexpected chart state: {:?}", other),
        }
        app.cycle_chart_column();
        assert_eq!(app.chart_column, 0);
    }

    #[test]
    fn test_cursor_editing_handles_multibyte() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with_csv(&dir);

        for c in "prix é".chars() {
            app.insert_char(c);
        }
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.question, "prixé");
        app.move_cursor_end();
        app.delete_word_backward();
        assert_eq!(app.question, "");
    }

    #[test]
    fn test_row_form_navigation_wraps() {
        let mut form = RowForm::new(vec!["a".to_string(), "b".to_string()], 1);
        form.prev_field();
        assert_eq!(form.position(), (0, 1));
        assert!(form.is_last_field());
        form.next_field();
        assert_eq!(form.position(), (0, 0));
    }
}
