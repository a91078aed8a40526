#![forbid(unsafe_code)]

mod changes;
mod error;
mod mops;
mod mutation;
mod prompts;
mod requests;
mod support;
mod types;
mod versions;

pub use error::StoreError;
pub use requests::*;
pub use types::VersionChanges;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;

const DB_FILE_NAME: &str = "mops.db";

/// SQLite-backed MOP store. Every read goes to the database; nothing is cached.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        migrate_sqlite_schema(&conn)?;
        tracing::debug!(path = %db_path.display(), "opened mop store");

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage_dir.join(DB_FILE_NAME)
    }
}
