//! SQLite storage shared by the tracker's two surfaces.
//!
//! One file holds two unrelated tables:
//!
//! - `kv_slots`: keyed text payloads; the exam collection lives under
//!   [`crate::STORAGE_KEY`] when the SQLite slot backend is selected
//! - `data_points`: `{label, value}` rows served by the dashboard API

mod data_points;
mod schema;
mod slots;

pub use schema::*;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Cannot open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Owned connection with the tracker schema applied.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DbError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
