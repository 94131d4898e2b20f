//! HTTP client error types.

use crate::rate_gate::GateClosed;
use thiserror::Error;

/// Errors that can occur while talking to the Bitbucket API.
///
/// Non-2xx responses are not errors at this level; they are returned as data
/// and classified by the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, timeout).
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// A 2xx response body could not be decoded as the expected JSON.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded as JSON.
    #[error("Failed to encode request body for {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The shared rate gate stopped admitting requests.
    #[error(transparent)]
    GateClosed(#[from] GateClosed),
}

impl ApiError {
    /// Builds a transport error from a `reqwest` failure.
    pub(crate) fn transport(url: &str, error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("timed out ({error})")
        } else {
            error.to_string()
        };
        Self::Transport {
            url: url.to_string(),
            message,
        }
    }
}
