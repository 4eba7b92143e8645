//! Error types for relay-props

use thiserror::Error;

/// Validation error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value at {label}: expected {expected}, got {got}")]
    Invalid {
        label: String,
        expected: String,
        got: String,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// The field path/label the failure was reported at
    pub fn label(&self) -> &str {
        match self {
            Error::Invalid { label, .. } => label,
            Error::MissingField(path) => path,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
