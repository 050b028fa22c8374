use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "litescope")]
#[command(author, version, about = "A terminal browser for SQLite database files")]
pub struct Cli {
    /// Path to a SQLite database file (.sqlite, .db, .sqlite3)
    pub path: Option<PathBuf>,

    /// Print a table's rows non-interactively instead of starting the TUI
    #[arg(short, long)]
    pub table: Option<String>,

    /// Per-column substring filter for --table, COLUMN=TERM (repeatable)
    #[arg(short, long, value_name = "COLUMN=TERM", requires = "table")]
    pub filter: Vec<String>,

    /// Execute ad-hoc SQL non-interactively
    #[arg(short = 'q', long = "sql")]
    pub sql: Option<String>,

    /// Export the database image to PATH and exit
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Output format for non-interactive mode
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
