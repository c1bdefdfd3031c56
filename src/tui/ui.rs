use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart as LineChart, Clear, Dataset,
        GraphType, Paragraph, Row, Table, Wrap,
    },
    Frame,
};

use crate::present::{Chart, View};
use crate::translate::Translator;

use super::app::{App, Focus, Mode, RowForm};

pub fn draw<T: Translator>(frame: &mut Frame, app: &App<T>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Question input
            Constraint::Min(10),   // Results
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_question_input(frame, app, chunks[1]);
    draw_results(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    if app.mode == Mode::Command {
        draw_command_line(frame, app);
    }
    if let Some(ref form) = app.row_form {
        draw_row_form(frame, form);
    }
}

fn draw_header<T: Translator>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let table_info = match app.session.table() {
        Some(table) => format!(
            "{} ({} rows, {} columns)",
            table.name,
            table.row_count(),
            table.column_count()
        ),
        None => "no CSV loaded (:load <file>)".to_string(),
    };

    let header = Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(" askcsv", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(table_info, Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

fn draw_question_input<T: Translator>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let is_focused = app.focus == Focus::Question;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(" Question (i: insert, Enter: ask) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(app.question.as_str()), inner);

    if app.mode == Mode::Insert && is_focused {
        let cursor_x = inner.x + app.question[..app.cursor_pos].chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

fn draw_results<T: Translator>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let is_focused = app.focus == Focus::Results;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let title = match (&app.answer, &app.error) {
        (_, Some(_)) => " Error ".to_string(),
        (Some(answer), None) => format!(" SQL: {} ", answer.sql.replace('\n', " ")),
        (None, None) => " Results ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(ref error) = app.error {
        let error_text = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(error_text, inner);
        return;
    }

    let Some(ref answer) = app.answer else {
        let help = Paragraph::new("Type a question about the CSV and press Enter to ask")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, inner);
        return;
    };

    let table = match &answer.view {
        View::Table(table) => table,
        View::NoData { error } => {
            let color = if error.is_some() { Color::Red } else { Color::Yellow };
            let text = Paragraph::new(answer.view.message().unwrap_or_default())
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true });
            frame.render_widget(text, inner);
            return;
        }
    };

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    let header_cells: Vec<Cell> = table
        .columns
        .iter()
        .enumerate()
        .skip(app.result_horizontal_scroll)
        .map(|(i, name)| {
            let width = app.column_widths.get(i).copied().unwrap_or(10);
            Cell::from(truncate_string(name, width))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    let visible_height = panes[0].height.saturating_sub(2) as usize;
    let rows: Vec<Row> = table
        .rows
        .iter()
        .skip(app.result_scroll)
        .take(visible_height)
        .map(|row| {
            let cells: Vec<Cell> = row
                .values
                .iter()
                .enumerate()
                .skip(app.result_horizontal_scroll)
                .map(|(i, val)| {
                    let width = app.column_widths.get(i).copied().unwrap_or(10);
                    Cell::from(truncate_string(&val.to_string(), width))
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = app
        .column_widths
        .iter()
        .skip(app.result_horizontal_scroll)
        .map(|&w| Constraint::Length(w as u16 + 2))
        .collect();

    let table_widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(format!(" {} rows ", table.row_count())))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(table_widget, panes[0]);

    draw_visualization(frame, app, panes[1]);
}

fn draw_visualization<T: Translator>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let block = Block::default()
        .title(format!(" Visualization: {} (c: type, v: column) ", app.chart_kind.label()))
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.current_chart() {
        Some(Ok(chart)) => draw_chart(frame, &chart, inner),
        Some(Err(warning)) => {
            let text = Paragraph::new(warning.to_string())
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true });
            frame.render_widget(text, inner);
        }
        None => {}
    }
}

fn draw_chart(frame: &mut Frame, chart: &Chart, area: Rect) {
    match chart {
        Chart::Bar { column, points } => {
            let bars: Vec<Bar> = points
                .iter()
                .map(|(i, v)| {
                    Bar::default()
                        .value(v.max(0.0).round() as u64)
                        .text_value(format_number(*v))
                        .label(Line::from(i.to_string()))
                })
                .collect();
            let widget = BarChart::default()
                .block(Block::default().title(column.as_str()))
                .data(BarGroup::default().bars(&bars))
                .bar_width(5)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Cyan));
            frame.render_widget(widget, area);
        }
        Chart::Line { column, points } => {
            let data: Vec<(f64, f64)> = points.iter().map(|(i, v)| (*i as f64, *v)).collect();
            let (min, max) = bounds(data.iter().map(|(_, y)| *y));
            let last_x = data.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);

            let datasets = vec![Dataset::default()
                .name(column.as_str())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&data)];
            let widget = LineChart::new(datasets)
                .x_axis(
                    Axis::default()
                        .bounds([0.0, last_x])
                        .labels(vec![Span::raw("0"), Span::raw(format_number(last_x))]),
                )
                .y_axis(
                    Axis::default()
                        .bounds([min, max])
                        .labels(vec![Span::raw(format_number(min)), Span::raw(format_number(max))]),
                );
            frame.render_widget(widget, area);
        }
        Chart::Histogram { column, buckets } => {
            let bars: Vec<Bar> = buckets
                .iter()
                .map(|b| {
                    Bar::default()
                        .value(b.count as u64)
                        .label(Line::from(format_number(b.lower)))
                })
                .collect();
            let widget = BarChart::default()
                .block(Block::default().title(format!("{} (frequency)", column)))
                .data(BarGroup::default().bars(&bars))
                .bar_width(6)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Magenta));
            frame.render_widget(widget, area);
        }
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if min == max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

fn draw_row_form(frame: &mut Frame, form: &RowForm) {
    let area = frame.area();
    let lines_needed = form.field_count().saturating_add(form.values.len()).saturating_add(3);
    let height = u16::try_from(lines_needed).unwrap_or(u16::MAX).min(area.height);
    let width = (area.width / 3).saturating_mul(2).max(30).min(area.width);
    let popup = Rect {
        x: (area.width - width) / 2,
        y: (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let label_width = form.columns.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    let (active_row, active_col) = form.position();

    let mut lines = Vec::new();
    for (r, values) in form.values.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("Row {}", r + 1),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        for (c, (name, value)) in form.columns.iter().zip(values).enumerate() {
            let style = if (r, c) == (active_row, active_col) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(format!("  {:>width$}: ", name, width = label_width)),
                Span::styled(format!("{} ", value), style),
            ]));
        }
    }

    let block = Block::default()
        .title(" Enter additional data (Tab: next, Enter: add, Esc: cancel) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let row_lines = u16::try_from(form.columns.len().saturating_add(1)).unwrap_or(u16::MAX);
    let focused_row = u16::try_from(active_row).unwrap_or(u16::MAX);
    let scroll = focused_row.saturating_mul(row_lines);
    let inner_height = height.saturating_sub(2);
    let offset = scroll.saturating_sub(inner_height.saturating_sub(row_lines));
    frame.render_widget(Paragraph::new(lines).block(block).scroll((offset, 0)), popup);
}

fn draw_status_bar<T: Translator>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let mode_str = match app.mode {
        Mode::Normal => "NORMAL",
        Mode::Insert => "INSERT",
        Mode::Command => "COMMAND",
        Mode::RowEntry => "ADD ROWS",
    };

    let mode_color = match app.mode {
        Mode::Normal => Color::Blue,
        Mode::Insert => Color::Green,
        Mode::Command => Color::Yellow,
        Mode::RowEntry => Color::Magenta,
    };

    let focus_str = match app.focus {
        Focus::Question => "Question",
        Focus::Results => "Results",
    };

    let delete_box = if app.session.delete_on_close() {
        "[x] delete store on exit"
    } else {
        "[ ] delete store on exit"
    };

    let help = match app.mode {
        Mode::Normal => "i:insert  Enter:ask  c/v:chart  :add n  :load f  :delete  q:quit",
        Mode::Insert => "Esc:normal  Enter:ask  Up/Down:history",
        Mode::Command => "ask sql load add delete clear q  Esc:cancel",
        Mode::RowEntry => "Tab/Shift+Tab:move  Enter:add rows  Esc:cancel",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode_str),
            Style::default().fg(Color::Black).bg(mode_color),
        ),
        Span::raw(" "),
        Span::styled(format!("[{}]", focus_str), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(delete_box, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
    ];
    match app.message {
        Some(ref message) => spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Green))),
        None => spans.push(Span::styled(help, Style::default().fg(Color::DarkGray))),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_command_line<T: Translator>(frame: &mut Frame, app: &App<T>) {
    let area = frame.area();
    let popup_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, popup_area);

    let command_line = Paragraph::new(format!(":{}", app.command_buffer))
        .style(Style::default().fg(Color::White));

    frame.render_widget(command_line, popup_area);

    frame.set_cursor_position((1 + app.command_buffer.chars().count() as u16, popup_area.y));
}
