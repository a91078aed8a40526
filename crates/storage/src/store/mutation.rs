#![forbid(unsafe_code)]

use super::changes::{NewChange, record_change_tx};
use super::*;
use mop_core::{AppliedEdit, ChangeEdit, FieldKind, Mop, ProposedChange, prerequisites};
use rusqlite::{TransactionBehavior, params};

impl SqliteStore {
    /// Applies a batch of changes as one version bump.
    ///
    /// Either every change is applied, logged with `target_version = version + 1`, and
    /// the version is bumped, or nothing is written at all. The immediate transaction
    /// takes the database write lock up front, so concurrent batches against the same
    /// MOP serialize and never produce the same version twice.
    pub fn apply_changes(&mut self, request: ApplyChangesRequest) -> Result<Mop, StoreError> {
        let ApplyChangesRequest {
            mop_id,
            expected_version,
            changes,
        } = request;

        let edits = changes
            .into_iter()
            .map(ProposedChange::into_edit)
            .collect::<Result<Vec<ChangeEdit>, _>>()?;

        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = load_mop(&tx, mop_id)?.ok_or(StoreError::UnknownId)?;
        if let Some(expected) = expected_version
            && expected != current.version
        {
            return Err(StoreError::VersionMismatch {
                expected,
                actual: current.version,
            });
        }

        let new_version = current.version + 1;
        let mut next = current.clone();
        let mut applied = Vec::with_capacity(edits.len());
        for edit in &edits {
            let outcome = edit.apply(&mut next)?;
            if !outcome.old_value_matched {
                tracing::warn!(
                    mop_id,
                    field = %outcome.field,
                    step_number = ?outcome.step_number,
                    "proposed old value differs from stored value; recording stored value"
                );
            }
            applied.push(outcome);
        }

        for outcome in &applied {
            record_change_tx(
                &tx,
                NewChange {
                    mop_id,
                    field: outcome.field,
                    old_value: &outcome.old_value,
                    new_value: &outcome.new_value,
                    target_version: new_version,
                    step_number: outcome.step_number,
                    changed_at_ms: now_ms,
                },
            )?;
            write_step_tx(&tx, outcome)?;
        }

        let updated = tx.execute(
            r#"
            UPDATE mops
            SET title = ?3, description = ?4, prerequisites = ?5, version = ?6, updated_at_ms = ?7
            WHERE id = ?1 AND version = ?2
            "#,
            params![
                mop_id,
                current.version,
                next.title,
                next.description,
                prerequisites::encode(&next.prerequisites)?,
                new_version,
                now_ms
            ],
        )?;
        if updated != 1 {
            return Err(StoreError::InvalidInput("mop changed during update"));
        }

        tx.commit()?;
        tracing::info!(
            mop_id,
            from_version = current.version,
            to_version = new_version,
            changes = applied.len(),
            "applied mop changes"
        );

        next.version = new_version;
        Ok(next)
    }
}

fn write_step_tx(tx: &rusqlite::Transaction<'_>, outcome: &AppliedEdit) -> Result<(), StoreError> {
    if outcome.field != FieldKind::Steps {
        return Ok(());
    }
    let Some(step_id) = outcome.step_id else {
        return Ok(());
    };
    tx.execute(
        "UPDATE steps SET action = ?2 WHERE id = ?1",
        params![step_id, outcome.new_value],
    )?;
    Ok(())
}
