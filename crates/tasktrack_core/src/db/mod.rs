//! SQLite backing for the `kv_store` table that holds the task blob.
//!
//! # Responsibility
//! - Open the store file (creating its directory) or an in-memory store.
//! - Bring the schema up to date before the store reads or writes.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A file written by a newer binary is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or talking to the store database.
#[derive(Debug)]
pub enum DbError {
    /// Directory that should hold the store file could not be created.
    CreateDirectory { path: PathBuf, source: io::Error },
    /// SQLite refused to open the store.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// A schema step failed; the whole upgrade was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// Store was written by a newer schema than this binary knows.
    SchemaTooNew { found: u32, supported: u32 },
    /// Statement against an open store failed.
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDirectory { path, source } => write!(
                f,
                "cannot create store directory {}: {source}",
                path.display()
            ),
            Self::Open { target, source } => write!(f, "cannot open store {target}: {source}"),
            Self::Migration { version, source } => {
                write!(f, "store schema upgrade to version {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "store schema version {found} is newer than supported {supported}"
            ),
            Self::Sqlite(err) => write!(f, "store query failed: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
