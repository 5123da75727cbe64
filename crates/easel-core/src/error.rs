//! Error types shared by every Easel crate.

use thiserror::Error;

/// Errors raised by the public sketch entry points.
///
/// Both variants are raised before any state is mutated, so a caller can fix
/// its arguments and retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EaselError {
    /// Malformed arguments to a public entry point.
    #[error("{call}(): {reason}")]
    Validation { call: String, reason: String },

    /// Unrecognized compositing mode token.
    #[error("blendMode(): unsupported compositing mode `{0}`")]
    UnsupportedMode(String),

    /// A sketch configuration document could not be loaded.
    #[error("invalid sketch config: {0}")]
    Config(String),
}

impl EaselError {
    pub fn validation(call: &str, reason: impl Into<String>) -> Self {
        EaselError::Validation {
            call: call.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for Easel operations.
pub type Result<T> = std::result::Result<T, EaselError>;

/// Failure to write a backend context property.
///
/// Never surfaced through the sketch API: restoring a snapshot after a resize
/// skips properties that fail with one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("unknown context property `{0}`")]
    Unknown(String),

    #[error("context property `{0}` is read-only")]
    ReadOnly(String),

    #[error("context property `{key}` expects a {expected} value")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("invalid value `{value}` for context property `{key}`")]
    InvalidValue { key: String, value: String },
}
