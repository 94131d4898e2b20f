//! Rate-gated Bitbucket API client.
//!
//! [`ApiClient`] wraps a [`Transport`] and routes every request through the
//! shared [`RateGate`]. Non-2xx responses are handed back as data: JSON reads
//! yield `None` (with a warning) and POSTs return the raw status and body for
//! the caller to classify.

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod transport;

pub use error::ApiError;
pub use transport::{RawResponse, ReqwestTransport, Transport};

use crate::rate_gate::RateGate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Authenticated, rate-gated client for the Bitbucket REST API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    gate: RateGate,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client. `base_url` must not end with a slash.
    pub fn new(
        transport: Arc<dyn Transport>,
        gate: RateGate,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            gate,
            base_url: base_url.into(),
        }
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the gate shared by every request of this client.
    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    /// Joins `path` (which starts with `/`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issues a gated GET and returns the response whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if no response was received.
    pub async fn get_raw(&self, url: &str) -> Result<RawResponse, ApiError> {
        let _permit = self.gate.acquire().await?;
        self.transport.get(url).await
    }

    /// Issues a gated GET and decodes a 2xx body as JSON.
    ///
    /// Any non-2xx status yields `Ok(None)` and a warning; callers treat it as
    /// "data unavailable" whether the cause was 404 or 5xx.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if no response was received or a 2xx body is not
    /// valid JSON for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ApiError> {
        let response = self.get_raw(url).await?;
        if !response.is_success() {
            warn!(url, status = response.status, "Failed to fetch");
            return Ok(None);
        }
        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Issues a gated POST with a JSON body and returns `(status, body)`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the body cannot be encoded or no response was
    /// received.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<(u16, String), ApiError> {
        let payload = serde_json::to_value(body).map_err(|source| ApiError::Encode {
            url: url.to_string(),
            source,
        })?;
        let _permit = self.gate.acquire().await?;
        let response = self.transport.post_json(url, &payload).await?;
        Ok((response.status, response.body))
    }
}
