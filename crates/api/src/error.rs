#![forbid(unsafe_code)]

use crate::generator::GenerateError;
use mop_storage::StoreError;

/// Hard failures of an [`crate::Api`] call. Not-found conditions never end up here; they
/// become a soft [`crate::ApiOutput`] message instead.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    GenerationFailed(GenerateError),
    Parse(String),
    Store(StoreError),
}

impl ApiError {
    /// Stable machine-readable code used in the CLI envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "INVALID_INPUT",
            Self::GenerationFailed(_) => "GENERATION_FAILED",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Store(StoreError::VersionMismatch { .. }) => "VERSION_MISMATCH",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::GenerationFailed(err) => write!(f, "generation failed: {err}"),
            Self::Parse(message) => write!(f, "unexpected generator output: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GenerationFailed(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GenerateError> for ApiError {
    fn from(value: GenerateError) -> Self {
        Self::GenerationFailed(value)
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        if value.is_validation() {
            Self::Validation(value.to_string())
        } else {
            Self::Store(value)
        }
    }
}
