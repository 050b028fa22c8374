use std::fs;
use std::io::Write;
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};
use tempfile::NamedTempFile;

use crate::query::composer::quote_ident;
use crate::result::{ResultSet, Value};

use super::error::{EngineError, Result};

const BACKUP_PAGES_PER_STEP: std::os::raw::c_int = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    View,
}

/// One table or view from the database's system catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: ObjectKind,
}

/// An in-memory SQLite database instance.
///
/// Loading and exporting go through the online-backup API with a staging
/// file, so an invalid byte image fails here rather than on first use.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn empty() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Builds an instance from a serialized database image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut staging = NamedTempFile::new()?;
        staging.write_all(bytes)?;
        staging.flush()?;

        let src = Connection::open(staging.path())
            .map_err(|e| EngineError::InvalidImage(e.to_string()))?;
        let mut conn = Connection::open_in_memory()?;
        {
            let backup = Backup::new(&src, &mut conn)
                .map_err(|e| EngineError::InvalidImage(e.to_string()))?;
            backup
                .run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)
                .map_err(|e| EngineError::InvalidImage(e.to_string()))?;
        }

        Ok(Self { conn })
    }

    /// Serializes the current state back to a database image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let staging = NamedTempFile::new()?;
        {
            let mut dst = Connection::open(staging.path())?;
            let backup = Backup::new(&self.conn, &mut dst)?;
            backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)?;
        }
        Ok(fs::read(staging.path())?)
    }

    /// Executes a single statement with bound parameters and collects its
    /// rows. Statements without row metadata yield an empty column list.
    pub fn query(&self, sql: &str, params: &[String]) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let width = columns.len();

        let mut set = ResultSet::new(columns);
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        while let Some(row) = rows.next()? {
            set.values.push(read_row(row, width)?);
        }
        Ok(set)
    }

    /// Runs a possibly multi-statement script. Each row-producing
    /// statement contributes one result set; DDL and DML contribute none.
    pub fn execute_script(&self, sql: &str) -> Result<Vec<ResultSet>> {
        let mut results = Vec::new();
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next()? {
            if stmt.column_count() == 0 {
                stmt.execute([])?;
                continue;
            }
            let columns: Vec<String> =
                stmt.column_names().iter().map(|s| s.to_string()).collect();
            let width = columns.len();
            let mut set = ResultSet::new(columns);
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                set.values.push(read_row(row, width)?);
            }
            results.push(set);
        }
        Ok(results)
    }

    /// Tables and views from the system catalog, ordered by name.
    pub fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;

        let entries = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let kind: String = row.get(1)?;
                Ok(CatalogEntry {
                    name,
                    kind: if kind == "view" {
                        ObjectKind::View
                    } else {
                        ObjectKind::Table
                    },
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Column names of a table or view in declaration order.
    pub fn table_columns(&self, name: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(name)))?;

        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        if columns.is_empty() {
            return Err(EngineError::TableNotFound(name.to_string()));
        }
        Ok(columns)
    }
}

fn read_row(row: &rusqlite::Row, width: usize) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(width);
    for i in 0..width {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => Value::Blob(v.to_vec()),
        };
        values.push(value);
    }
    Ok(values)
}
