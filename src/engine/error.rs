use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a valid database image: {0}")]
    InvalidImage(String),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("No such column: {0}")]
    ColumnNotFound(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
