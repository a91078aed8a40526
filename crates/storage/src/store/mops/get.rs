#![forbid(unsafe_code)]

use super::super::*;
use mop_core::{Mop, MopSummary};
use rusqlite::params;

impl SqliteStore {
    /// Current state with steps ordered by step number.
    pub fn get_mop(&self, id: i64) -> Result<Option<Mop>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mop = load_mop(&tx, id)?;
        tx.commit()?;
        Ok(mop)
    }

    /// The MOP with the highest id.
    pub fn get_latest_mop(&self) -> Result<Option<Mop>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mop = match latest_mop_id(&tx)? {
            Some(id) => load_mop(&tx, id)?,
            None => None,
        };
        tx.commit()?;
        Ok(mop)
    }

    /// Newest first.
    pub fn list_mops(&self, request: ListMopsRequest) -> Result<Vec<MopSummary>, StoreError> {
        let limit = to_sqlite_i64(request.limit)?;
        let offset = to_sqlite_i64(request.offset)?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT m.id, m.title, m.version, COUNT(s.id), m.created_at_ms
            FROM mops m
            LEFT JOIN steps s ON s.mop_id = m.id
            GROUP BY m.id
            ORDER BY m.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;
        let rows = stmt.query_map(params![limit, offset], summary_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
