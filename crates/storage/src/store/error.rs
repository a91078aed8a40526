#![forbid(unsafe_code)]

use mop_core::{ChangeError, ListError};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    Change(ChangeError),
    Prerequisites(ListError),
    UnknownId,
    StepNotFound { step_number: i64 },
    VersionMismatch { expected: i64, actual: i64 },
}

impl StoreError {
    /// Not-found conditions are recoverable at the request boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownId | Self::StepNotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::Change(_) | Self::Prerequisites(_)
        )
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Change(err) => write!(f, "invalid change: {err}"),
            Self::Prerequisites(err) => write!(f, "invalid prerequisites: {err}"),
            Self::UnknownId => write!(f, "unknown id"),
            Self::StepNotFound { step_number } => {
                write!(f, "step not found (step_number={step_number})")
            }
            Self::VersionMismatch { expected, actual } => {
                write!(f, "version mismatch (expected={expected}, actual={actual})")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            Self::Change(err) => Some(err),
            Self::Prerequisites(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<ListError> for StoreError {
    fn from(value: ListError) -> Self {
        Self::Prerequisites(value)
    }
}

impl From<ChangeError> for StoreError {
    fn from(value: ChangeError) -> Self {
        match value {
            ChangeError::StepNotFound { step_number } => Self::StepNotFound { step_number },
            ChangeError::Prerequisites(err) => Self::Prerequisites(err),
            other => Self::Change(other),
        }
    }
}
