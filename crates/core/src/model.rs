#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// One action line of a MOP.
///
/// `id` is assigned once by the store and never changes; `step_number` is the 1-based
/// display position inside the owning MOP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: i64,
    pub step_number: i64,
    pub mop_id: i64,
    pub action: String,
}

/// A Methods of Procedure document in its current (or reconstructed) state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mop {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub prerequisites: Vec<String>,
    pub steps: Vec<Step>,
    pub version: i64,
    pub created_at_ms: i64,
}

impl Mop {
    pub fn step_by_number(&self, step_number: i64) -> Option<&Step> {
        self.steps
            .iter()
            .find(|step| step.step_number == step_number)
    }

    pub fn step_by_number_mut(&mut self, step_number: i64) -> Option<&mut Step> {
        self.steps
            .iter_mut()
            .find(|step| step.step_number == step_number)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MopSummary {
    pub id: i64,
    pub title: String,
    pub version: i64,
    pub step_count: usize,
    pub created_at_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    GeneralInfo,
    DetailedSteps,
    Validation,
}

impl PromptKind {
    pub const ALL: [PromptKind; 3] = [
        PromptKind::GeneralInfo,
        PromptKind::DetailedSteps,
        PromptKind::Validation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeneralInfo => "general_info",
            Self::DetailedSteps => "detailed_steps",
            Self::Validation => "validation",
        }
    }

    /// Accepts both `general_info` and `general-info` spellings.
    pub fn parse(value: &str) -> Result<Self, PromptKindError> {
        match value.trim().replace('-', "_").as_str() {
            "general_info" => Ok(Self::GeneralInfo),
            "detailed_steps" => Ok(Self::DetailedSteps),
            "validation" => Ok(Self::Validation),
            _ => Err(PromptKindError {
                value: value.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptKindError {
    pub value: String,
}

impl std::fmt::Display for PromptKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown prompt kind '{}' (expected general_info|detailed_steps|validation)",
            self.value
        )
    }
}

impl std::error::Error for PromptKindError {}

/// A mutable template used to drive the content generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub kind: PromptKind,
    pub content: String,
    pub updated_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mop {
        Mop {
            id: 7,
            title: "Swap PSU".to_string(),
            description: "Replace a failed power supply".to_string(),
            prerequisites: vec!["gloves".to_string()],
            steps: vec![
                Step {
                    id: 21,
                    step_number: 1,
                    mop_id: 7,
                    action: "Confirm redundancy".to_string(),
                },
                Step {
                    id: 22,
                    step_number: 2,
                    mop_id: 7,
                    action: "Pull the failed unit".to_string(),
                },
            ],
            version: 3,
            created_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn steps_are_found_by_number_not_id() {
        let mop = sample();
        assert_eq!(mop.step_by_number(2).map(|s| s.id), Some(22));
        assert!(mop.step_by_number(22).is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(value["createdAtMs"], 1_700_000_000_000i64);
        assert_eq!(value["steps"][0]["stepNumber"], 1);
        assert_eq!(value["steps"][0]["mopId"], 7);
    }

    #[test]
    fn prompt_kind_accepts_dashed_names() {
        assert_eq!(
            PromptKind::parse("general-info"),
            Ok(PromptKind::GeneralInfo)
        );
        assert_eq!(
            PromptKind::parse(" detailed_steps "),
            Ok(PromptKind::DetailedSteps)
        );
        assert!(PromptKind::parse("summary").is_err());
    }
}
