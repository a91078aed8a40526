#![forbid(unsafe_code)]

use super::super::*;
use mop_core::{Mop, Step, prerequisites};
use rusqlite::{TransactionBehavior, params};

impl SqliteStore {
    /// Creates a MOP at version 1 with steps numbered 1..N in input order.
    pub fn create_mop(&mut self, request: CreateMopRequest) -> Result<Mop, StoreError> {
        let CreateMopRequest {
            title,
            description,
            prerequisites,
            steps,
        } = request;

        if title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        if steps.is_empty() {
            return Err(StoreError::InvalidInput("steps must not be empty"));
        }
        if steps.iter().any(|action| action.trim().is_empty()) {
            return Err(StoreError::InvalidInput("step action must not be empty"));
        }
        let encoded_prerequisites = prerequisites::encode(&prerequisites)?;

        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            r#"
            INSERT INTO mops(
                title, description, prerequisites, version, created_at_ms, updated_at_ms
            )
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            "#,
            params![title, description, encoded_prerequisites, now_ms],
        )?;
        let mop_id = tx.last_insert_rowid();

        let mut created_steps = Vec::with_capacity(steps.len());
        {
            let mut stmt =
                tx.prepare("INSERT INTO steps(mop_id, step_number, action) VALUES (?1, ?2, ?3)")?;
            for (index, action) in steps.into_iter().enumerate() {
                let step_number = to_sqlite_i64(index + 1)?;
                stmt.execute(params![mop_id, step_number, action])?;
                created_steps.push(Step {
                    id: tx.last_insert_rowid(),
                    step_number,
                    mop_id,
                    action,
                });
            }
        }

        tx.commit()?;
        tracing::info!(mop_id, steps = created_steps.len(), "created mop");

        Ok(Mop {
            id: mop_id,
            title,
            description,
            prerequisites,
            steps: created_steps,
            version: 1,
            created_at_ms: now_ms,
        })
    }
}
