//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while assembling a [`WorkspaceConfig`](super::WorkspaceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse config file '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A required value was not supplied anywhere.
    #[error("Missing required setting '{field}'")]
    MissingValue { field: &'static str },

    /// A supplied value is unusable.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError { field: &'static str, message: String },
}
