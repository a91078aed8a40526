#![forbid(unsafe_code)]

use crate::model::Mop;
use crate::prerequisites::{self, ListError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Title,
    Description,
    Prerequisites,
    Steps,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Prerequisites => "prerequisites",
            Self::Steps => "steps",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ChangeError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "prerequisites" => Ok(Self::Prerequisites),
            "steps" => Ok(Self::Steps),
            _ => Err(ChangeError::UnknownField(value.to_string())),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeError {
    UnknownField(String),
    StepNumberRequired,
    StepNumberNotAllowed { field: FieldKind },
    InvalidStepNumber(i64),
    ValueShape { field: FieldKind },
    EmptyValue { field: FieldKind },
    Prerequisites(ListError),
    StepNotFound { step_number: i64 },
}

impl std::fmt::Display for ChangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(field) => write!(
                f,
                "unknown field '{field}' (expected title|description|prerequisites|steps)"
            ),
            Self::StepNumberRequired => write!(f, "field=steps requires a stepNumber"),
            Self::StepNumberNotAllowed { field } => {
                write!(f, "stepNumber is only allowed with field=steps (got {field})")
            }
            Self::InvalidStepNumber(n) => write!(f, "stepNumber must be >= 1 (got {n})"),
            Self::ValueShape { field } => write!(f, "value has the wrong shape for {field}"),
            Self::EmptyValue { field } => write!(f, "new value for {field} must not be empty"),
            Self::Prerequisites(err) => write!(f, "prerequisites: {err}"),
            Self::StepNotFound { step_number } => write!(f, "step {step_number} not found"),
        }
    }
}

impl std::error::Error for ChangeError {}

impl From<ListError> for ChangeError {
    fn from(value: ListError) -> Self {
        Self::Prerequisites(value)
    }
}

/// A proposed old/new value: plain text, or a list for prerequisites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Text(String),
    List(Vec<String>),
}

impl ChangeValue {
    fn into_text(self, field: FieldKind) -> Result<String, ChangeError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::List(_) => Err(ChangeError::ValueShape { field }),
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Self::Text(text) => prerequisites::decode(&text),
            Self::List(items) => items,
        }
    }
}

/// Untrusted change tuple as produced by a proposal producer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChange {
    pub field: String,
    #[serde(default)]
    pub old_value: Option<ChangeValue>,
    pub new_value: ChangeValue,
    #[serde(default)]
    pub step_number: Option<i64>,
}

impl ProposedChange {
    pub fn into_edit(self) -> Result<ChangeEdit, ChangeError> {
        let field = FieldKind::parse(&self.field)?;
        match (field, self.step_number) {
            (FieldKind::Steps, None) => Err(ChangeError::StepNumberRequired),
            (FieldKind::Steps, Some(n)) if n < 1 => Err(ChangeError::InvalidStepNumber(n)),
            (FieldKind::Steps, Some(step_number)) => {
                let new = self.new_value.into_text(field)?;
                if new.trim().is_empty() {
                    return Err(ChangeError::EmptyValue { field });
                }
                let expected_old = self.old_value.map(|v| v.into_text(field)).transpose()?;
                Ok(ChangeEdit::StepAction {
                    step_number,
                    expected_old,
                    new,
                })
            }
            (field, Some(_)) => Err(ChangeError::StepNumberNotAllowed { field }),
            (FieldKind::Title, None) => {
                let new = self.new_value.into_text(field)?;
                if new.trim().is_empty() {
                    return Err(ChangeError::EmptyValue { field });
                }
                let expected_old = self.old_value.map(|v| v.into_text(field)).transpose()?;
                Ok(ChangeEdit::Title { expected_old, new })
            }
            (FieldKind::Description, None) => {
                let new = self.new_value.into_text(field)?;
                let expected_old = self.old_value.map(|v| v.into_text(field)).transpose()?;
                Ok(ChangeEdit::Description { expected_old, new })
            }
            (FieldKind::Prerequisites, None) => {
                let new = self.new_value.into_list();
                prerequisites::validate(&new)?;
                let expected_old = self.old_value.map(ChangeValue::into_list);
                Ok(ChangeEdit::Prerequisites { expected_old, new })
            }
        }
    }
}

/// A structurally valid edit of one MOP attribute or one step action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEdit {
    Title {
        expected_old: Option<String>,
        new: String,
    },
    Description {
        expected_old: Option<String>,
        new: String,
    },
    Prerequisites {
        expected_old: Option<Vec<String>>,
        new: Vec<String>,
    },
    StepAction {
        step_number: i64,
        expected_old: Option<String>,
        new: String,
    },
}

/// What an edit did to a snapshot, in change-log shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedEdit {
    pub field: FieldKind,
    pub old_value: String,
    pub new_value: String,
    pub step_number: Option<i64>,
    pub step_id: Option<i64>,
    /// False when the caller's expected old value disagreed with the snapshot.
    pub old_value_matched: bool,
}

impl ChangeEdit {
    pub fn field(&self) -> FieldKind {
        match self {
            Self::Title { .. } => FieldKind::Title,
            Self::Description { .. } => FieldKind::Description,
            Self::Prerequisites { .. } => FieldKind::Prerequisites,
            Self::StepAction { .. } => FieldKind::Steps,
        }
    }

    pub fn step_number(&self) -> Option<i64> {
        match self {
            Self::StepAction { step_number, .. } => Some(*step_number),
            _ => None,
        }
    }

    /// Applies the edit in place. The recorded old value is always the one found in
    /// `mop`, never the caller's expectation.
    pub fn apply(&self, mop: &mut Mop) -> Result<AppliedEdit, ChangeError> {
        match self {
            Self::Title { expected_old, new } => {
                let old = std::mem::replace(&mut mop.title, new.clone());
                Ok(text_edit(FieldKind::Title, old, new, expected_old))
            }
            Self::Description { expected_old, new } => {
                let old = std::mem::replace(&mut mop.description, new.clone());
                Ok(text_edit(FieldKind::Description, old, new, expected_old))
            }
            Self::Prerequisites { expected_old, new } => {
                let new_value = prerequisites::encode(new)?;
                let old = std::mem::replace(&mut mop.prerequisites, new.clone());
                let old_value_matched = expected_old.as_ref().is_none_or(|e| e == &old);
                Ok(AppliedEdit {
                    field: FieldKind::Prerequisites,
                    old_value: prerequisites::encode(&old)?,
                    new_value,
                    step_number: None,
                    step_id: None,
                    old_value_matched,
                })
            }
            Self::StepAction {
                step_number,
                expected_old,
                new,
            } => {
                let step = mop
                    .step_by_number_mut(*step_number)
                    .ok_or(ChangeError::StepNotFound {
                        step_number: *step_number,
                    })?;
                let old = std::mem::replace(&mut step.action, new.clone());
                let mut applied = text_edit(FieldKind::Steps, old, new, expected_old);
                applied.step_number = Some(*step_number);
                applied.step_id = Some(step.id);
                Ok(applied)
            }
        }
    }
}

fn text_edit(
    field: FieldKind,
    old: String,
    new: &str,
    expected_old: &Option<String>,
) -> AppliedEdit {
    let old_value_matched = expected_old.as_deref().is_none_or(|e| e == old);
    AppliedEdit {
        field,
        old_value: old,
        new_value: new.to_string(),
        step_number: None,
        step_id: None,
        old_value_matched,
    }
}

/// One permanent change-log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub id: i64,
    pub mop_id: i64,
    pub field: FieldKind,
    pub old_value: String,
    pub new_value: String,
    pub target_version: i64,
    pub step_number: Option<i64>,
    pub changed_at_ms: i64,
}

impl ChangeRecord {
    /// Old and new values in presentation shape (lists for prerequisites).
    pub fn values(&self) -> (ChangeValue, ChangeValue) {
        match self.field {
            FieldKind::Prerequisites => (
                ChangeValue::List(prerequisites::decode(&self.old_value)),
                ChangeValue::List(prerequisites::decode(&self.new_value)),
            ),
            _ => (
                ChangeValue::Text(self.old_value.clone()),
                ChangeValue::Text(self.new_value.clone()),
            ),
        }
    }
}
