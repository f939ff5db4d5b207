//! Core error types for countdown-core.
//!
//! Everything a user can trigger (bad duration input, broken config file,
//! missing sound player) ends up in [`CoreError`] through `thiserror`
//! conversions so callers can use `?` throughout.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for countdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Audio output errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected user input. The messages are shown to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input was not a whole number
    #[error("Please enter a valid number between {min} and {max} minutes.")]
    NotANumber { input: String, min: u32, max: u32 },

    /// Number outside the accepted minute range
    #[error("Please enter a valid number between {min} and {max} minutes.")]
    DurationOutOfRange { minutes: i64, min: u32, max: u32 },
}

/// Failure to produce sound. Never fatal to the alarm lifecycle.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The platform refused to open or play the output
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    /// The output was used before being acquired
    #[error("audio output not acquired")]
    NotAcquired,

    #[error("audio io: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_user_facing() {
        let err = ValidationError::DurationOutOfRange {
            minutes: 1000,
            min: 1,
            max: 999,
        };
        assert_eq!(
            err.to_string(),
            "Please enter a valid number between 1 and 999 minutes."
        );
    }

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::NotANumber {
            input: "abc".into(),
            min: 1,
            max: 999,
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().starts_with("Please enter"));
    }
}
