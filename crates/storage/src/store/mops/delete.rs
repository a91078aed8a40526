#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::{TransactionBehavior, params};

impl SqliteStore {
    /// Removes the MOP together with its steps and change log. Returns false if it did
    /// not exist.
    pub fn delete_mop(&mut self, id: i64) -> Result<bool, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx.execute("DELETE FROM mops WHERE id = ?1", params![id])?;
        tx.commit()?;
        if deleted > 0 {
            tracing::info!(mop_id = id, "deleted mop");
        }
        Ok(deleted > 0)
    }
}
