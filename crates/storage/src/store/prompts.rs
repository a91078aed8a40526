#![forbid(unsafe_code)]

use super::*;
use mop_core::{Prompt, PromptKind};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

impl SqliteStore {
    pub fn get_prompt(&self, kind: PromptKind) -> Result<Option<Prompt>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT kind, content, updated_at_ms FROM prompts WHERE kind = ?1",
                params![kind.as_str()],
                prompt_row,
            )
            .optional()?)
    }

    pub fn list_prompts(&self) -> Result<Vec<Prompt>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, content, updated_at_ms FROM prompts ORDER BY kind ASC")?;
        let rows = stmt.query_map([], prompt_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Replaces the stored template for `kind`.
    pub fn set_prompt(&mut self, kind: PromptKind, content: &str) -> Result<Prompt, StoreError> {
        if content.trim().is_empty() {
            return Err(StoreError::InvalidInput("prompt content must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            r#"
            INSERT INTO prompts(kind, content, updated_at_ms)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(kind) DO UPDATE
            SET content=excluded.content, updated_at_ms=excluded.updated_at_ms
            "#,
            params![kind.as_str(), content, now_ms],
        )?;
        tx.commit()?;
        tracing::info!(kind = %kind, "updated prompt template");

        Ok(Prompt {
            kind,
            content: content.to_string(),
            updated_at_ms: now_ms,
        })
    }
}
