#![forbid(unsafe_code)]

use super::types::group_by_version;
use super::*;
use mop_core::{ChangeRecord, FieldKind};
use rusqlite::{Transaction, params};

/// A change-log entry about to be written.
pub(in crate::store) struct NewChange<'a> {
    pub(in crate::store) mop_id: i64,
    pub(in crate::store) field: FieldKind,
    pub(in crate::store) old_value: &'a str,
    pub(in crate::store) new_value: &'a str,
    pub(in crate::store) target_version: i64,
    pub(in crate::store) step_number: Option<i64>,
    pub(in crate::store) changed_at_ms: i64,
}

/// Appends one entry. The log has no update or delete path; the schema rejects updates.
pub(in crate::store) fn record_change_tx(
    tx: &Transaction<'_>,
    change: NewChange<'_>,
) -> Result<ChangeRecord, StoreError> {
    if (change.field == FieldKind::Steps) != change.step_number.is_some() {
        return Err(StoreError::InvalidInput(
            "step_number must be set exactly when field=steps",
        ));
    }
    tx.execute(
        r#"
        INSERT INTO changes(
            mop_id, field, old_value, new_value, target_version, step_number, changed_at_ms
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            change.mop_id,
            change.field.as_str(),
            change.old_value,
            change.new_value,
            change.target_version,
            change.step_number,
            change.changed_at_ms
        ],
    )?;
    Ok(ChangeRecord {
        id: tx.last_insert_rowid(),
        mop_id: change.mop_id,
        field: change.field,
        old_value: change.old_value.to_string(),
        new_value: change.new_value.to_string(),
        target_version: change.target_version,
        step_number: change.step_number,
        changed_at_ms: change.changed_at_ms,
    })
}

impl SqliteStore {
    /// Every change-log entry of a MOP, ascending by target version and then by the
    /// order in which they were applied.
    pub fn list_changes(&self, mop_id: i64) -> Result<Vec<ChangeRecord>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        if !mop_exists(&tx, mop_id)? {
            return Err(StoreError::UnknownId);
        }
        let changes = load_changes(&tx, mop_id, None)?;
        tx.commit()?;
        Ok(changes)
    }

    /// [`SqliteStore::list_changes`] grouped per produced version.
    pub fn change_history(&self, mop_id: i64) -> Result<Vec<VersionChanges>, StoreError> {
        Ok(group_by_version(self.list_changes(mop_id)?))
    }
}
