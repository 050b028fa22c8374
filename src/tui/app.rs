use std::path::{Path, PathBuf};

use ratatui::layout::Rect;

use crate::engine::Session;
use crate::query::{compose, SearchTerms};
use crate::result::ResultSet;

use super::grid::GridState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,
    Filter,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Catalog,
    Results,
}

/// The table or view the derived query runs against, with its columns in
/// declaration order.
pub struct SelectedTable {
    pub name: String,
    pub columns: Vec<String>,
}

/// One rendered column of the grid: index plus the cells it occupies.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpan {
    pub index: usize,
    pub x: u16,
    pub width: u16,
}

/// Screen geometry recorded at draw time so mouse events can be routed
/// back to catalog entries, header cells, and resize handles.
#[derive(Debug, Default, Clone)]
pub struct Viewport {
    pub sidebar: Option<Rect>,
    pub grid: Option<Rect>,
    pub header_y: Option<u16>,
    pub filter_y: Option<u16>,
    pub spans: Vec<ColumnSpan>,
}

pub struct App {
    pub session: Session,
    pub mode: Mode,
    pub focus: Focus,
    pub should_quit: bool,

    pub catalog_cursor: usize,
    pub sidebar_scroll: usize,
    pub table: Option<SelectedTable>,
    pub terms: SearchTerms,

    pub results: Vec<ResultSet>,
    pub grids: Vec<GridState>,
    pub last_sql: String,
    pub error: Option<String>,
    pub status: Option<String>,

    pub active_column: usize,
    pub row_scroll: usize,
    pub col_scroll: usize,
    pub filter_buffer: String,
    pub command_buffer: String,

    pub viewport: Viewport,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            mode: Mode::Normal,
            focus: Focus::Catalog,
            should_quit: false,
            catalog_cursor: 0,
            sidebar_scroll: 0,
            table: None,
            terms: SearchTerms::new(),
            results: Vec::new(),
            grids: Vec::new(),
            last_sql: String::new(),
            error: None,
            status: None,
            active_column: 0,
            row_scroll: 0,
            col_scroll: 0,
            filter_buffer: String::new(),
            command_buffer: String::new(),
            viewport: Viewport::default(),
        }
    }

    // --- catalog -----------------------------------------------------------

    pub fn catalog_up(&mut self) {
        self.catalog_cursor = self.catalog_cursor.saturating_sub(1);
    }

    pub fn catalog_down(&mut self) {
        let len = self.session.catalog().len();
        if len > 0 && self.catalog_cursor < len - 1 {
            self.catalog_cursor += 1;
        }
    }

    /// Selects the catalog entry under the cursor as the active table.
    pub fn select_under_cursor(&mut self) {
        if let Some(entry) = self.session.catalog().get(self.catalog_cursor) {
            let name = entry.name.clone();
            self.select_table(&name);
        }
    }

    pub fn select_catalog_index(&mut self, index: usize) {
        if index < self.session.catalog().len() {
            self.catalog_cursor = index;
            self.select_under_cursor();
        }
    }

    /// Switching tables clears every search term, then immediately issues
    /// the bare select for the new table.
    pub fn select_table(&mut self, name: &str) {
        match self.session.table_columns(name) {
            Ok(columns) => {
                self.table = Some(SelectedTable {
                    name: name.to_string(),
                    columns,
                });
                self.terms.clear();
                self.active_column = 0;
                self.col_scroll = 0;
                self.focus = Focus::Results;
                self.run_query();
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    // --- search terms ------------------------------------------------------

    /// Updates one column's term and recomposes from the merged map.
    /// Columns outside the selected table are rejected.
    pub fn set_term(&mut self, column: &str, value: &str) {
        let known = self
            .table
            .as_ref()
            .map(|t| t.columns.iter().any(|c| c == column))
            .unwrap_or(false);
        if !known {
            return;
        }
        self.terms.set(column, value);
        self.run_query();
    }

    pub fn clear_terms(&mut self) {
        if self.table.is_some() && !self.terms.is_empty() {
            self.terms.clear();
            self.run_query();
        }
    }

    pub fn active_column_name(&self) -> Option<&str> {
        self.table
            .as_ref()
            .and_then(|t| t.columns.get(self.active_column))
            .map(|s| s.as_str())
    }

    // --- filter editing ----------------------------------------------------

    pub fn enter_filter_mode(&mut self) {
        if let Some(name) = self.active_column_name() {
            self.filter_buffer = self.terms.get(name).unwrap_or("").to_string();
            self.mode = Mode::Filter;
            self.focus = Focus::Results;
        }
    }

    pub fn leave_filter_mode(&mut self) {
        self.mode = Mode::Normal;
        self.filter_buffer.clear();
    }

    /// Filter edits apply per keystroke, recomposing and re-executing on
    /// every change.
    pub fn filter_push(&mut self, c: char) {
        self.filter_buffer.push(c);
        self.apply_filter_buffer();
    }

    pub fn filter_backspace(&mut self) {
        self.filter_buffer.pop();
        self.apply_filter_buffer();
    }

    fn apply_filter_buffer(&mut self) {
        if let Some(name) = self.active_column_name().map(|s| s.to_string()) {
            let value = self.filter_buffer.clone();
            self.set_term(&name, &value);
        }
    }

    // --- query execution ---------------------------------------------------

    /// Recomposes the derived query and executes it, replacing the shown
    /// result sets. A failing execution clears them and keeps the SQL
    /// text of the attempt next to the engine's message.
    pub fn run_query(&mut self) {
        let Some(table) = &self.table else {
            self.results.clear();
            self.grids.clear();
            self.last_sql.clear();
            return;
        };

        let composed = compose(&table.name, &table.columns, &self.terms);
        self.last_sql = composed.sql.clone();

        match self.session.db().query(&composed.sql, &composed.params) {
            Ok(set) => {
                self.grids = vec![GridState::new(set.column_count())];
                self.results = vec![set];
                self.error = None;
                self.row_scroll = 0;
            }
            Err(e) => {
                self.results.clear();
                self.grids.clear();
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn current_result(&self) -> Option<&ResultSet> {
        self.results.first()
    }

    pub fn current_grid(&self) -> Option<&GridState> {
        self.grids.first()
    }

    pub fn current_grid_mut(&mut self) -> Option<&mut GridState> {
        self.grids.first_mut()
    }

    // --- column cursor and scrolling ---------------------------------------

    pub fn column_left(&mut self) {
        self.active_column = self.active_column.saturating_sub(1);
        if self.active_column < self.col_scroll {
            self.col_scroll = self.active_column;
        }
    }

    pub fn column_right(&mut self) {
        let count = self
            .current_result()
            .map(|r| r.column_count())
            .unwrap_or(0);
        if count > 0 && self.active_column < count - 1 {
            self.active_column += 1;
        }
    }

    pub fn scroll_rows_up(&mut self) {
        self.row_scroll = self.row_scroll.saturating_sub(1);
    }

    pub fn scroll_rows_down(&mut self) {
        if let Some(set) = self.current_result() {
            if self.row_scroll < set.row_count().saturating_sub(1) {
                self.row_scroll += 1;
            }
        }
    }

    pub fn page_up(&mut self) {
        self.row_scroll = self.row_scroll.saturating_sub(10);
    }

    pub fn page_down(&mut self) {
        if let Some(set) = self.current_result() {
            self.row_scroll = (self.row_scroll + 10).min(set.row_count().saturating_sub(1));
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.row_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        if let Some(set) = self.current_result() {
            self.row_scroll = set.row_count().saturating_sub(1);
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Catalog => Focus::Results,
            Focus::Results => Focus::Catalog,
        };
    }

    // --- session operations ------------------------------------------------

    /// Loads a database file. On failure the previous instance stays
    /// loaded and only the error message changes.
    pub fn load(&mut self, path: &Path) {
        match self.session.load_from_path(path) {
            Ok(()) => {
                self.table = None;
                self.terms.clear();
                self.results.clear();
                self.grids.clear();
                self.last_sql.clear();
                self.catalog_cursor = 0;
                self.sidebar_scroll = 0;
                self.focus = Focus::Catalog;
                self.error = None;
                self.status = Some(format!(
                    "Loaded {} ({} objects)",
                    path.display(),
                    self.session.catalog().len()
                ));
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn export(&mut self, path: Option<&Path>) {
        let target: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(self.session.export_name()),
        };
        match self.session.export_to_path(&target) {
            Ok(()) => {
                self.status = Some(format!("Exported to {}", target.display()));
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    // --- command mode ------------------------------------------------------

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_buffer.clear();
    }

    pub fn execute_command(&mut self) {
        let input = self.command_buffer.trim().to_string();
        self.command_buffer.clear();
        self.mode = Mode::Normal;

        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((c, a)) => (c, Some(a.trim())),
            None => (input.as_str(), None),
        };

        match cmd {
            "q" | "quit" => self.should_quit = true,
            "open" | "o" => match arg {
                Some(path) => self.load(Path::new(path)),
                None => self.error = Some("usage: :open <path>".to_string()),
            },
            "w" | "write" | "export" => self.export(arg.map(Path::new)),
            "clear" => self.clear_terms(),
            "" => {}
            other => self.error = Some(format!("unknown command: {}", other)),
        }
    }
}
