use std::io::stdout;

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::error;

use askcsv::cli::{Cli, OutputFormat};
use askcsv::config::Config;
use askcsv::logging::{self, LogTarget};
use askcsv::present::{render_chart, render_csv, render_json, render_table, View};
use askcsv::session::{Answer, Session, SessionContext};
use askcsv::storage::csv::CsvReader;
use askcsv::translate::{GeminiClient, Translator};
use askcsv::tui::{app::App, input::handle_events, ui::draw};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    let target = match (&cli.log_file, cli.is_headless()) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    logging::init(target).map_err(|e| e.to_string())?;

    let mut config = Config::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }

    let ctx = SessionContext::new(&config.db_path)
        .with_delete_on_close(cli.delete_on_close)
        .with_sanitize(!cli.raw_sql);
    let mut session = Session::new(ctx, config.translator());
    let reader = CsvReader::new()
        .with_delimiter(cli.delimiter)
        .with_header(!cli.no_header);

    // Every exit path below closes the session.
    if let Err(e) = prepare(&mut session, &cli, &reader) {
        close_session(&mut session);
        return Err(e);
    }

    if cli.is_headless() {
        let result = run_headless(&session, &cli);
        close_session(&mut session);
        result
    } else {
        let mut app = App::new(session, reader);
        let result = run_tui(&mut app);
        close_session(&mut app.session);
        result
    }
}

/// Loads the CSV and appends `--add-row` rows.
fn prepare<T: Translator>(
    session: &mut Session<T>,
    cli: &Cli,
    reader: &CsvReader,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.path {
        session.ingest_csv(path, reader)?;
    }

    let rows = cli.manual_rows();
    if !rows.is_empty() {
        let count = session.append_rows(rows)?;
        eprintln!("Appended {} rows to the store", count);
    }
    Ok(())
}

fn run_headless(
    session: &Session<GeminiClient>,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let answer = match (&cli.question, &cli.sql) {
        (Some(question), _) => session.ask(question)?,
        (None, Some(sql)) => session.run_sql(sql),
        (None, None) => return Ok(()),
    };
    print_answer(&answer, cli);
    Ok(())
}

fn print_answer(answer: &Answer, cli: &Cli) {
    if answer.question.is_some() {
        eprintln!("SQL: {}", answer.sql);
    }

    let table = match &answer.view {
        View::Table(table) => table,
        no_data => {
            println!("{}", no_data.message().unwrap_or_default());
            return;
        }
    };

    let rendered = match cli.format {
        OutputFormat::Table => Ok(render_table(table)),
        OutputFormat::Csv => render_csv(table).map_err(|e| e.to_string()),
        OutputFormat::Json => render_json(table).map_err(|e| e.to_string()),
    };
    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => eprintln!("Could not render result: {}", e),
    }

    if let Some(kind) = cli.chart {
        let chart = match &cli.column {
            Some(column) => table.chart(kind, column),
            None => table.default_chart(kind),
        };
        match chart {
            Ok(chart) => println!("\n{}", render_chart(&chart)),
            Err(warning) => eprintln!("Warning: {}", warning),
        }
    }
}

fn close_session<T: Translator>(session: &mut Session<T>) {
    match session.close() {
        Ok(true) => eprintln!("Deleted store file {}", session.store().path().display()),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "failed to delete store file");
            eprintln!("Failed to delete store file: {}", e);
        }
    }
}

fn run_tui<T: Translator>(app: &mut App<T>) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let result = event_loop(app);
    let restored = restore_terminal();
    result.and(restored)
}

fn event_loop<T: Translator>(app: &mut App<T>) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if handle_events(app)? {
            break;
        }
    }
    Ok(())
}

fn restore_terminal() -> Result<(), Box<dyn std::error::Error>> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}
