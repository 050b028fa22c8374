use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

use super::app::{App, Focus, Mode};
use super::grid::UNITS_PER_CELL;

pub fn handle_events(app: &mut App) -> std::io::Result<bool> {
    if event::poll(Duration::from_millis(100))? {
        match event::read()? {
            Event::Key(key) => handle_key_event(app, key),
            Event::Mouse(mouse) => handle_mouse_event(app, mouse),
            _ => {}
        }
    }
    Ok(app.should_quit)
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Handle Ctrl+C globally
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        match app.mode {
            Mode::Normal => app.should_quit = true,
            Mode::Filter => app.leave_filter_mode(),
            Mode::Command => {
                app.command_buffer.clear();
                app.mode = Mode::Normal;
            }
        }
        return;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Filter => handle_filter_mode(app, key),
        Mode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::Tab => app.toggle_focus(),

        // Vertical movement: catalog cursor or row scroll by focus
        KeyCode::Char('j') | KeyCode::Down => {
            if app.focus == Focus::Catalog {
                app.catalog_down();
            } else {
                app.scroll_rows_down();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.focus == Focus::Catalog {
                app.catalog_up();
            } else {
                app.scroll_rows_up();
            }
        }

        KeyCode::Enter => {
            if app.focus == Focus::Catalog {
                app.select_under_cursor();
            }
        }

        // Column cursor
        KeyCode::Char('h') | KeyCode::Left => {
            if app.focus == Focus::Results {
                app.column_left();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.focus == Focus::Results {
                app.column_right();
            }
        }

        // Sort toggle on the cursor column
        KeyCode::Char('s') => {
            if app.focus == Focus::Results {
                let column = app.active_column;
                if let Some(grid) = app.current_grid_mut() {
                    grid.toggle_sort(column);
                }
            }
        }

        // Filter editing and clearing
        KeyCode::Char('/') | KeyCode::Char('i') => {
            if app.focus == Focus::Results {
                app.enter_filter_mode();
            }
        }
        KeyCode::Char('c') => app.clear_terms(),

        // Keyboard column resize
        KeyCode::Char('<') => {
            if app.focus == Focus::Results {
                let column = app.active_column;
                if let Some(grid) = app.current_grid_mut() {
                    grid.adjust_width(column, -1);
                }
            }
        }
        KeyCode::Char('>') => {
            if app.focus == Focus::Results {
                let column = app.active_column;
                if let Some(grid) = app.current_grid_mut() {
                    grid.adjust_width(column, 1);
                }
            }
        }

        // Page navigation
        KeyCode::Char('g') => {
            if app.focus == Focus::Results {
                app.scroll_to_top();
            }
        }
        KeyCode::Char('G') => {
            if app.focus == Focus::Results {
                app.scroll_to_bottom();
            }
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_up();
        }

        // Quick export to the default target
        KeyCode::Char('e') => app.export(None),

        _ => {}
    }
}

fn handle_filter_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.leave_filter_mode(),
        KeyCode::Backspace => app.filter_backspace(),
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.command_buffer.clear();
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => app.execute_command(),
        KeyCode::Backspace => {
            app.command_buffer.pop();
            if app.command_buffer.is_empty() {
                app.mode = Mode::Normal;
            }
        }
        KeyCode::Char(c) => app.command_buffer.push(c),
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            handle_mouse_down(app, mouse.column, mouse.row)
        }
        // An active drag receives every move regardless of position, so
        // it survives the pointer leaving the handle.
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            handle_mouse_move(app, mouse.column)
        }
        MouseEventKind::Up(_) => {
            if let Some(grid) = app.current_grid_mut() {
                grid.end_resize();
            }
        }
        MouseEventKind::ScrollDown => app.scroll_rows_down(),
        MouseEventKind::ScrollUp => app.scroll_rows_up(),
        _ => {}
    }
}

fn handle_mouse_down(app: &mut App, x: u16, y: u16) {
    let viewport = app.viewport.clone();

    if let Some(sidebar) = viewport.sidebar {
        if contains(sidebar, x, y) {
            let index = app.sidebar_scroll + (y - sidebar.y) as usize;
            app.select_catalog_index(index);
            return;
        }
    }

    if viewport.header_y == Some(y) {
        for span in &viewport.spans {
            // The spacing cell after a column doubles as its resize handle.
            if x == span.x + span.width {
                app.active_column = span.index;
                if let Some(grid) = app.current_grid_mut() {
                    grid.begin_resize(span.index);
                }
                return;
            }
            if x >= span.x && x < span.x + span.width {
                app.active_column = span.index;
                if let Some(grid) = app.current_grid_mut() {
                    grid.toggle_sort(span.index);
                }
                return;
            }
        }
        return;
    }

    if viewport.filter_y == Some(y) {
        for span in &viewport.spans {
            if x >= span.x && x < span.x + span.width {
                app.active_column = span.index;
                app.enter_filter_mode();
                return;
            }
        }
        return;
    }

    if let Some(grid_area) = viewport.grid {
        if contains(grid_area, x, y) {
            for span in &viewport.spans {
                if x >= span.x && x < span.x + span.width {
                    app.active_column = span.index;
                    app.focus = Focus::Results;
                    return;
                }
            }
        }
    }
}

fn handle_mouse_move(app: &mut App, x: u16) {
    let Some(grid_area) = app.viewport.grid else {
        return;
    };
    if let Some(grid) = app.current_grid_mut() {
        if grid.is_resizing() {
            // The dragged column's width is the pointer's distance from
            // the grid's left edge.
            let units = x.saturating_sub(grid_area.x).saturating_mul(UNITS_PER_CELL);
            grid.resize_to(units);
        }
    }
}

fn contains(area: ratatui::layout::Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}
