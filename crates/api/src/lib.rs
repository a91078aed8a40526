#![forbid(unsafe_code)]

mod api;
pub mod cli;
pub mod config;
mod draft;
mod error;
pub mod generator;
mod parse;
mod revise;
pub mod templates;

pub use api::{Api, ApiOutput, ChangeView, NO_MOPS, NOTHING_TO_APPLY, VersionHistory};
pub use config::{AppConfig, GeneratorConfig};
pub use draft::MopInput;
pub use error::ApiError;
pub use generator::{CommandGenerator, ContentGenerator, GenerateError};
