//! Wire-level request execution.

use super::error::ApiError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes authenticated requests against absolute URLs.
///
/// Implementations must read the whole body before returning so that a rate
/// gate permit held around the call covers the entire exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET request.
    async fn get(&self, url: &str) -> Result<RawResponse, ApiError>;

    /// Issues a POST request with a JSON body.
    async fn post_json(&self, url: &str, body: &serde_json::Value)
        -> Result<RawResponse, ApiError>;
}

/// [`Transport`] backed by `reqwest`, using HTTP Basic Auth on every call.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    username: String,
    app_password: String,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Builds a transport with a fixed credential and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    /// (for example, when no TLS backend is available).
    pub fn new(
        username: impl Into<String>,
        app_password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("branch-replicator/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            username: username.into(),
            app_password: app_password.into(),
        })
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<RawResponse, ApiError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(url, &e))?;
        debug!(url, status, "Received response");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, ApiError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await
            .map_err(|e| ApiError::transport(url, &e))?;
        Self::read(url, response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, ApiError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.username, Some(&self.app_password))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::transport(url, &e))?;
        Self::read(url, response).await
    }
}
