use std::fs;
use std::path::Path;

use super::db::{CatalogEntry, Database};
use super::error::{EngineError, Result};

/// Export target when no database file was ever loaded.
pub const DEFAULT_EXPORT_NAME: &str = "database.sqlite";

const ACCEPTED_EXTENSIONS: [&str; 3] = ["sqlite", "db", "sqlite3"];

/// Owns the current database instance, its display name, and the catalog
/// snapshot taken after the last successful load.
///
/// A failed load keeps the previous instance and catalog intact; the new
/// instance and its catalog are built fully before either is installed.
pub struct Session {
    db: Database,
    display_name: Option<String>,
    catalog: Vec<CatalogEntry>,
}

impl Session {
    /// Starts with an empty in-memory instance.
    pub fn new() -> Result<Self> {
        Ok(Self {
            db: Database::empty()?,
            display_name: None,
            catalog: Vec::new(),
        })
    }

    pub fn load_from_bytes(&mut self, bytes: &[u8], display_name: &str) -> Result<()> {
        let db = Database::from_bytes(bytes)?;
        let catalog = db.catalog()?;

        self.db = db;
        self.catalog = catalog;
        self.display_name = Some(display_name.to_string());
        Ok(())
    }

    /// Reads the whole file into memory and loads it. Only `.sqlite`,
    /// `.db`, and `.sqlite3` files are accepted.
    pub fn load_from_path(&mut self, path: &Path) -> Result<()> {
        if !accepted_extension(path) {
            return Err(EngineError::UnsupportedExtension(
                path.display().to_string(),
            ));
        }

        let bytes = fs::read(path)?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());
        self.load_from_bytes(&bytes, &display_name)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    /// Re-reads the catalog from the current instance, e.g. after a
    /// script changed the schema.
    pub fn refresh_catalog(&mut self) -> Result<()> {
        self.catalog = self.db.catalog()?;
        Ok(())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Filename exports default to: the loaded name, else a fixed one.
    pub fn export_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(DEFAULT_EXPORT_NAME)
    }

    pub fn table_columns(&self, name: &str) -> Result<Vec<String>> {
        self.db.table_columns(name)
    }

    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        self.db.to_bytes()
    }

    pub fn export_to_path(&self, path: &Path) -> Result<()> {
        let bytes = self.export_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
