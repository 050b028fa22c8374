use std::io::stdout;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use litescope::cli::{Cli, OutputFormat};
use litescope::engine::Session;
use litescope::query::{compose, SearchTerms};
use litescope::result::{ResultSet, Value};
use litescope::tui::{app::App, input::handle_events, ui::draw};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    let non_interactive = cli.sql.is_some() || cli.table.is_some() || cli.export.is_some();

    let mut session = Session::new()?;
    let mut load_error = None;
    if let Some(path) = &cli.path {
        match session.load_from_path(path) {
            Ok(()) => {}
            Err(e) if non_interactive => return Err(e.into()),
            // The TUI starts with the error shown and an empty instance.
            Err(e) => load_error = Some(e.to_string()),
        }
    }

    if non_interactive {
        run_batch(&mut session, &cli)?;
        return Ok(());
    }

    run_tui(session, load_error)
}

fn run_batch(session: &mut Session, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(sql) = &cli.sql {
        for set in session.db().execute_script(sql)? {
            print_result(&set, cli.format);
        }
        // The script may have changed the schema.
        session.refresh_catalog()?;
    }

    if let Some(table) = &cli.table {
        let columns = session.table_columns(table)?;
        let mut terms = SearchTerms::new();
        for raw in &cli.filter {
            let (column, term) = raw
                .split_once('=')
                .ok_or_else(|| format!("invalid filter (expected COLUMN=TERM): {}", raw))?;
            if !columns.iter().any(|c| c == column) {
                return Err(format!("no such column in {}: {}", table, column).into());
            }
            terms.set(column, term);
        }

        let composed = compose(table, &columns, &terms);
        let set = session.db().query(&composed.sql, &composed.params)?;
        print_result(&set, cli.format);
    }

    if let Some(path) = &cli.export {
        session.export_to_path(path)?;
        eprintln!("Exported to {}", path.display());
    }

    Ok(())
}

fn print_result(set: &ResultSet, format: OutputFormat) {
    match format {
        OutputFormat::Table => print_table(set),
        OutputFormat::Csv => print_csv(set),
        OutputFormat::Json => print_json(set),
    }
}

fn print_table(set: &ResultSet) {
    if set.row_count() == 0 {
        println!("(0 rows)");
        return;
    }

    // Calculate column widths
    let widths: Vec<usize> = set
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let max_value_width = set
                .values
                .iter()
                .map(|row| row.get(i).map(|v| v.to_string().len()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            name.len().max(max_value_width)
        })
        .collect();

    let header: Vec<String> = set
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{:width$}", name, width = widths[i]))
        .collect();
    println!("{}", header.join(" | "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("-+-"));

    for row in &set.values {
        let values: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:width$}", v, width = widths[i]))
            .collect();
        println!("{}", values.join(" | "));
    }

    println!("({} rows)", set.row_count());
}

fn print_csv(set: &ResultSet) {
    println!("{}", set.columns.join(","));

    for row in &set.values {
        let values: Vec<String> = row
            .iter()
            .map(|v| {
                let s = v.to_string();
                if s.contains(',') || s.contains('"') || s.contains('\n') {
                    format!("\"{}\"", s.replace('"', "\"\""))
                } else {
                    s
                }
            })
            .collect();
        println!("{}", values.join(","));
    }
}

fn print_json(set: &ResultSet) {
    print!("[");
    for (i, row) in set.values.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        print!("{{");
        for (j, (name, value)) in set.columns.iter().zip(row.iter()).enumerate() {
            if j > 0 {
                print!(",");
            }
            let rendered = match value {
                Value::Text(s) => {
                    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
                }
                Value::Blob(_) => format!("\"{}\"", value),
                Value::Null => "null".to_string(),
                _ => value.to_string(),
            };
            print!("\"{}\":{}", name, rendered);
        }
        print!("}}");
    }
    println!("]");
}

fn run_tui(
    session: Session,
    load_error: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    app.error = load_error;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal even when the loop errored
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if handle_events(app)? {
            return Ok(());
        }
    }
}
