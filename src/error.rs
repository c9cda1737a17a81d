//! Error types for the therapy trainer.

use std::path::PathBuf;

use crate::session::{Phase, ProfileField};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Profile rejected: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A single profile field failing validation.
///
/// These are always recoverable: the presentation layer shows them next to the
/// offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Age is required")]
    AgeMissing,

    #[error("Age must be between 18 and 100")]
    AgeOutOfRange,

    #[error("Symptom category is required")]
    SymptomMissing,

    #[error("{field} is required")]
    FieldMissing { field: ProfileField },
}

/// Every field error from a failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Commands issued in a phase where they do not apply.
///
/// The presentation layer normally prevents these structurally (disabled
/// controls); the controller rejects them instead of corrupting state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {command} during the {phase} phase")]
    InvalidPhase { command: &'static str, phase: Phase },

    #[error("A patient reply is still pending")]
    ReplyPending,

    #[error("No patient reply is pending")]
    NoReplyPending,
}

/// Failures writing the transcript report to disk.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for the trainer.
pub type Result<T> = std::result::Result<T, Error>;
