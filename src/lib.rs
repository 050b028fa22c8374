pub mod cli;
pub mod engine;
pub mod query;
pub mod result;
pub mod tui;

pub use engine::{CatalogEntry, Database, EngineError, ObjectKind, Session};
pub use query::{compose, ComposedQuery, SearchTerms};
pub use result::{ResultSet, Value};
