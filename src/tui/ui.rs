use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, ColumnSpan, Focus, Mode};
use super::grid::{SortConfig, SortDirection};
use crate::engine::ObjectKind;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_body(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if app.mode == Mode::Command {
        draw_command_line(frame, app);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let db_name = app.session.display_name().unwrap_or("(empty database)");
    let header = Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            "litescope",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(db_name, Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

fn draw_body(frame: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(30)])
        .split(area);

    draw_sidebar(frame, app, columns[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(columns[1]);

    draw_query_bar(frame, app, main[0]);
    draw_results(frame, app, main[1]);
}

fn draw_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Catalog;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(format!(" Tables ({}) ", app.session.catalog().len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.viewport.sidebar = Some(inner);

    // Keep the cursor visible inside the scroll window.
    let height = inner.height as usize;
    if height > 0 {
        if app.catalog_cursor < app.sidebar_scroll {
            app.sidebar_scroll = app.catalog_cursor;
        } else if app.catalog_cursor >= app.sidebar_scroll + height {
            app.sidebar_scroll = app.catalog_cursor + 1 - height;
        }
    }

    let selected = app.table.as_ref().map(|t| t.name.clone());
    let lines: Vec<Line> = app
        .session
        .catalog()
        .iter()
        .enumerate()
        .skip(app.sidebar_scroll)
        .take(height)
        .map(|(i, entry)| {
            let marker = match entry.kind {
                ObjectKind::Table => " ",
                ObjectKind::View => "v",
            };
            let mut style = Style::default();
            if selected.as_deref() == Some(entry.name.as_str()) {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            if i == app.catalog_cursor && is_focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(vec![
                Span::styled(format!("{} ", marker), Style::default().fg(Color::DarkGray)),
                Span::styled(entry.name.clone(), style),
            ])
        })
        .collect();

    if lines.is_empty() {
        let empty = Paragraph::new("No tables loaded.\n\nUse :open <path>")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, inner);
    } else {
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn draw_query_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Query ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.last_sql.is_empty() {
        let help = Paragraph::new("Select a table or view to compose a query")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, inner);
    } else {
        frame.render_widget(Paragraph::new(highlight_sql_line(&app.last_sql)), inner);
    }
}

fn highlight_sql_line(query: &str) -> Line<'static> {
    let keywords = [
        "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "LIKE", "ESCAPE", "ORDER", "BY", "ASC",
        "DESC", "LIMIT", "AS", "NULL", "IS", "IN",
    ];

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_string = false;

    for c in query.chars() {
        if in_string {
            current.push(c);
            if c == '\'' {
                spans.push(Span::styled(
                    current.clone(),
                    Style::default().fg(Color::Green),
                ));
                current.clear();
                in_string = false;
            }
        } else if c == '\'' {
            if !current.is_empty() {
                spans.push(colorize_word(&current, &keywords));
                current.clear();
            }
            current.push(c);
            in_string = true;
        } else if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else {
            if !current.is_empty() {
                spans.push(colorize_word(&current, &keywords));
                current.clear();
            }
            let style = match c {
                '?' => Style::default().fg(Color::Cyan),
                '"' | ';' => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            };
            spans.push(Span::styled(c.to_string(), style));
        }
    }

    if !current.is_empty() {
        if in_string {
            spans.push(Span::styled(current, Style::default().fg(Color::Green)));
        } else {
            spans.push(colorize_word(&current, &keywords));
        }
    }

    Line::from(spans)
}

fn colorize_word(word: &str, keywords: &[&str]) -> Span<'static> {
    let upper = word.to_uppercase();
    if keywords.contains(&upper.as_str()) {
        Span::styled(
            word.to_string(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
    } else if word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        Span::styled(word.to_string(), Style::default().fg(Color::Cyan))
    } else {
        Span::styled(word.to_string(), Style::default())
    }
}

fn draw_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Results;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let title = if let Some(set) = app.current_result() {
        format!(" Results ({} rows) ", set.row_count())
    } else {
        " Results ".to_string()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.viewport.grid = Some(inner);
    app.viewport.header_y = None;
    app.viewport.filter_y = None;
    app.viewport.spans.clear();

    if let Some(error) = &app.error {
        let error_text = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(error_text, inner);
        return;
    }

    let Some(set) = app.results.first() else {
        let help = Paragraph::new("Pick a table from the sidebar, / filters the cursor column")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, inner);
        return;
    };
    let Some(grid) = app.grids.first() else {
        return;
    };
    if inner.height < 3 || inner.width == 0 {
        return;
    }

    // Lay the visible columns out left to right; the spacing cell after
    // each one is its resize handle.
    let mut spans: Vec<ColumnSpan> = Vec::new();
    let mut x = inner.x;
    let right = inner.x + inner.width;
    for index in app.col_scroll..set.column_count() {
        if x >= right {
            break;
        }
        let width = grid.width_cells(index).min(right - x);
        if width == 0 {
            break;
        }
        spans.push(ColumnSpan { index, x, width });
        x += width + 1;
    }

    let sort = grid.sort();
    let header_line = Line::from(build_cells(&spans, |span| {
        let name = &set.columns[span.index];
        let marker = match sort {
            Some(SortConfig { key, direction }) if key == span.index => match direction {
                SortDirection::Ascending => " ^",
                SortDirection::Descending => " v",
            },
            _ => "",
        };
        let mut style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        if span.index == app.active_column && is_focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        (format!("{}{}", name, marker), style)
    }));

    let editing = app.mode == Mode::Filter;
    let filter_line = Line::from(build_cells(&spans, |span| {
        let name = &set.columns[span.index];
        let active = span.index == app.active_column;
        let text = if editing && active {
            app.filter_buffer.clone()
        } else {
            app.terms.get(name).unwrap_or("").to_string()
        };
        let style = if editing && active {
            Style::default().fg(Color::Green).add_modifier(Modifier::REVERSED)
        } else if !text.is_empty() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let shown = if text.is_empty() && !(editing && active) {
            "·".to_string()
        } else {
            text
        };
        (shown, style)
    }));

    let mut lines = vec![header_line, filter_line];

    let visible_height = inner.height.saturating_sub(2) as usize;
    let order = grid.sorted_indices(&set.values);
    for &row_index in order.iter().skip(app.row_scroll).take(visible_height) {
        let row = &set.values[row_index];
        lines.push(Line::from(build_cells(&spans, |span| {
            let text = row
                .get(span.index)
                .map(|v| v.to_string())
                .unwrap_or_default();
            let style = if row.get(span.index).map(|v| v.is_null()).unwrap_or(false) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            (text, style)
        })));
    }

    app.viewport.header_y = Some(inner.y);
    app.viewport.filter_y = Some(inner.y + 1);
    app.viewport.spans = spans;

    frame.render_widget(Paragraph::new(lines), inner);

    if editing {
        if let Some(span) = app
            .viewport
            .spans
            .iter()
            .find(|s| s.index == app.active_column)
        {
            let cursor_x = span.x + (app.filter_buffer.len() as u16).min(span.width.saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y + 1));
        }
    }
}

/// Builds one row of the grid: each visible column rendered into its
/// span's width, separated by a single spacing cell.
fn build_cells<F>(spans: &[ColumnSpan], mut cell: F) -> Vec<Span<'static>>
where
    F: FnMut(&ColumnSpan) -> (String, Style),
{
    let mut out = Vec::with_capacity(spans.len() * 2);
    for (i, span) in spans.iter().enumerate() {
        let (text, style) = cell(span);
        let width = span.width as usize;
        out.push(Span::styled(
            format!("{:<width$}", truncate_string(&text, width), width = width),
            style,
        ));
        if i + 1 < spans.len() {
            out.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }
    }
    out
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_str = match app.mode {
        Mode::Normal => "NORMAL",
        Mode::Filter => "FILTER",
        Mode::Command => "COMMAND",
    };

    let mode_color = match app.mode {
        Mode::Normal => Color::Blue,
        Mode::Filter => Color::Green,
        Mode::Command => Color::Yellow,
    };

    let focus_str = match app.focus {
        Focus::Catalog => "Tables",
        Focus::Results => "Results",
    };

    let help = match app.mode {
        Mode::Normal => "Enter:browse  /:filter  s:sort  </>:resize  c:clear  e:export  q:quit",
        Mode::Filter => "type to filter  Esc/Enter:done",
        Mode::Command => "open <path>  write [path]  clear  quit",
    };

    let message = if let Some(error) = &app.error {
        Span::styled(error.clone(), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status {
        Span::styled(status.clone(), Style::default().fg(Color::Green))
    } else {
        Span::styled(help, Style::default().fg(Color::DarkGray))
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_str),
            Style::default().fg(Color::Black).bg(mode_color),
        ),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", focus_str),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        message,
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

fn draw_command_line(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let popup_area = Rect {
        x: 0,
        y: area.height - 1,
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, popup_area);

    let command_line = Paragraph::new(format!(":{}", app.command_buffer))
        .style(Style::default().fg(Color::White));

    frame.render_widget(command_line, popup_area);
    frame.set_cursor_position((1 + app.command_buffer.len() as u16, popup_area.y));
}
