//! Runner error types.

use crate::config::ConfigError;
use crate::repositories::ListingError;

/// Errors that stop a run before any repository is processed.
///
/// Per-repository failures are never reported here; they are outcomes.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client initialization errors.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Listing failed under the strict listing policy.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// The repository list could not be written.
    #[error("Failed to write repository log '{path}': {source}")]
    RepoLog {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
