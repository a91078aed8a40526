#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use rusqlite::{Connection, params};

pub(super) const SCHEMA_VERSION: &str = "mop-v1";

pub(in crate::store) fn migrate_sqlite_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&sql::full_schema_sql())?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;

    let stored: String = conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params!["schema_version"],
        |row| row.get(0),
    )?;
    if stored != SCHEMA_VERSION {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        ));
    }
    Ok(())
}
