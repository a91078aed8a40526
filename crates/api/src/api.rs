#![forbid(unsafe_code)]

use crate::config::AppConfig;
use crate::draft::{MopInput, draft_mop};
use crate::error::ApiError;
use crate::generator::ContentGenerator;
use crate::revise::propose_changes;
use crate::templates::{Templates, effective_prompt};
use mop_core::{
    ChangeRecord, ChangeValue, FieldKind, Mop, MopSummary, Prompt, PromptKind, ProposedChange,
};
use mop_storage::{ApplyChangesRequest, ListMopsRequest, SqliteStore, StoreError, VersionChanges};
use serde::Serialize;

pub const NOTHING_TO_APPLY: &str = "Nothing to apply";
pub const NO_MOPS: &str = "No MOPs found";

/// Payload or a human-readable message. A message without data is a soft result
/// (not found, nothing to do), not a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOutput<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiOutput<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn is_soft(&self) -> bool {
        self.data.is_none()
    }
}

/// One change-log entry in presentation shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeView {
    pub id: i64,
    pub field: FieldKind,
    pub old_value: ChangeValue,
    pub new_value: ChangeValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<i64>,
}

impl From<&ChangeRecord> for ChangeView {
    fn from(record: &ChangeRecord) -> Self {
        let (old_value, new_value) = record.values();
        Self {
            id: record.id,
            field: record.field,
            old_value,
            new_value,
            step_number: record.step_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHistory {
    pub version: i64,
    pub changed_at_ms: i64,
    pub changes: Vec<ChangeView>,
}

impl From<VersionChanges> for VersionHistory {
    fn from(group: VersionChanges) -> Self {
        Self {
            version: group.version,
            changed_at_ms: group.changed_at_ms,
            changes: group.changes.iter().map(ChangeView::from).collect(),
        }
    }
}

fn not_found<T>(mop_id: i64) -> ApiOutput<T> {
    ApiOutput::message(format!("MOP {mop_id} not found"))
}

/// The request/response surface over one store and one content generator.
pub struct Api<G> {
    store: SqliteStore,
    generator: G,
}

impl<G: ContentGenerator> Api<G> {
    pub fn new(store: SqliteStore, generator: G) -> Self {
        Self { store, generator }
    }

    pub fn open(config: &AppConfig, generator: G) -> Result<Self, ApiError> {
        Ok(Self::new(SqliteStore::open(&config.storage_dir)?, generator))
    }

    /// Drafts a MOP with the generator and stores it at version 1.
    pub fn create_mop(&mut self, input: MopInput) -> Result<ApiOutput<Mop>, ApiError> {
        let templates = Templates::load(&self.store)?;
        let request = draft_mop(&self.generator, &templates, &input)?;
        let mop = self.store.create_mop(request)?;
        Ok(ApiOutput::data(mop))
    }

    pub fn get_mop(&self, mop_id: i64) -> Result<ApiOutput<Mop>, ApiError> {
        Ok(match self.store.get_mop(mop_id)? {
            Some(mop) => ApiOutput::data(mop),
            None => not_found(mop_id),
        })
    }

    pub fn get_latest_mop(&self) -> Result<ApiOutput<Mop>, ApiError> {
        Ok(match self.store.get_latest_mop()? {
            Some(mop) => ApiOutput::data(mop),
            None => ApiOutput::message(NO_MOPS),
        })
    }

    pub fn get_mop_version(&self, mop_id: i64, version: i64) -> Result<ApiOutput<Mop>, ApiError> {
        match self.store.get_mop_version(mop_id, version) {
            Ok(Some(mop)) => Ok(ApiOutput::data(mop)),
            Ok(None) => Ok(ApiOutput::message(format!(
                "Version {version} of MOP {mop_id} does not exist"
            ))),
            Err(StoreError::UnknownId) => Ok(not_found(mop_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Revises a MOP from free-text feedback. The generated proposals are applied
    /// against the version they were generated from.
    pub fn update_mop(&mut self, mop_id: i64, feedback: &str) -> Result<ApiOutput<Mop>, ApiError> {
        let Some(mop) = self.store.get_mop(mop_id)? else {
            return Ok(not_found(mop_id));
        };
        let proposals = propose_changes(&self.generator, &mop, feedback)?;
        self.apply(mop_id, Some(mop.version), proposals)
    }

    /// Applies caller-supplied proposals as one version bump.
    pub fn apply_changes(
        &mut self,
        mop_id: i64,
        expected_version: Option<i64>,
        changes: Vec<ProposedChange>,
    ) -> Result<ApiOutput<Mop>, ApiError> {
        self.apply(mop_id, expected_version, changes)
    }

    fn apply(
        &mut self,
        mop_id: i64,
        expected_version: Option<i64>,
        changes: Vec<ProposedChange>,
    ) -> Result<ApiOutput<Mop>, ApiError> {
        if changes.is_empty() {
            tracing::info!(mop_id, "no changes proposed");
            return Ok(ApiOutput::message(NOTHING_TO_APPLY));
        }
        let request = ApplyChangesRequest {
            mop_id,
            expected_version,
            changes,
        };
        match self.store.apply_changes(request) {
            Ok(mop) => Ok(ApiOutput::data(mop)),
            Err(StoreError::UnknownId) => Ok(not_found(mop_id)),
            Err(StoreError::StepNotFound { step_number }) => Ok(ApiOutput::message(format!(
                "Step {step_number} of MOP {mop_id} not found"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    pub fn get_changes(&self, mop_id: i64) -> Result<ApiOutput<Vec<VersionHistory>>, ApiError> {
        match self.store.change_history(mop_id) {
            Ok(history) => Ok(ApiOutput::data(
                history.into_iter().map(VersionHistory::from).collect(),
            )),
            Err(StoreError::UnknownId) => Ok(not_found(mop_id)),
            Err(err) => Err(err.into()),
        }
    }

    pub fn list_mops(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<ApiOutput<Vec<MopSummary>>, ApiError> {
        let mops = self.store.list_mops(ListMopsRequest { limit, offset })?;
        Ok(ApiOutput::data(mops))
    }

    pub fn delete_mop(&mut self, mop_id: i64) -> Result<ApiOutput<i64>, ApiError> {
        Ok(if self.store.delete_mop(mop_id)? {
            ApiOutput::data(mop_id)
        } else {
            not_found(mop_id)
        })
    }

    /// The stored template, or the built-in default when none was stored.
    pub fn get_prompt(&self, kind: PromptKind) -> Result<ApiOutput<Prompt>, ApiError> {
        Ok(ApiOutput::data(effective_prompt(&self.store, kind)?))
    }

    pub fn update_prompt(
        &mut self,
        kind: PromptKind,
        content: &str,
    ) -> Result<ApiOutput<Prompt>, ApiError> {
        Ok(ApiOutput::data(self.store.set_prompt(kind, content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serializes_only_present_fields() {
        let soft: ApiOutput<i64> = ApiOutput::message("MOP 3 not found");
        assert_eq!(
            serde_json::to_value(&soft).expect("json"),
            serde_json::json!({ "message": "MOP 3 not found" })
        );
        assert!(soft.is_soft());

        let hard = ApiOutput::data(3_i64);
        assert_eq!(
            serde_json::to_value(&hard).expect("json"),
            serde_json::json!({ "data": 3 })
        );
    }

    #[test]
    fn prerequisite_changes_present_as_lists() {
        let record = ChangeRecord {
            id: 1,
            mop_id: 2,
            field: FieldKind::Prerequisites,
            old_value: "wrench".to_string(),
            new_value: "wrench\u{1f}ladder".to_string(),
            target_version: 2,
            step_number: None,
            changed_at_ms: 0,
        };
        let json = serde_json::to_value(ChangeView::from(&record)).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "field": "prerequisites",
                "oldValue": ["wrench"],
                "newValue": ["wrench", "ladder"]
            })
        );
    }
}
