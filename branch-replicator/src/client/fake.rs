//! Scripted in-memory transport for tests.

use super::{ApiError, RawResponse, Transport};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Answers requests from a fixed route table and records every call.
///
/// Unknown GET routes answer `404`; unknown POST routes answer `500`.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    gets: Mutex<HashMap<String, RawResponse>>,
    posts: Mutex<HashMap<String, RawResponse>>,
    failing: Mutex<HashSet<String>>,
    get_log: Mutex<Vec<String>>,
    post_log: Mutex<Vec<(String, serde_json::Value)>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_get(&self, url: &str, status: u16, body: impl Into<String>) {
        self.gets
            .lock()
            .unwrap()
            .insert(url.to_string(), RawResponse::new(status, body));
    }

    pub(crate) fn on_post(&self, url: &str, status: u16, body: impl Into<String>) {
        self.posts
            .lock()
            .unwrap()
            .insert(url.to_string(), RawResponse::new(status, body));
    }

    /// Makes every request to `url` fail without a response.
    pub(crate) fn fail_get(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub(crate) fn gets(&self) -> Vec<String> {
        self.get_log.lock().unwrap().clone()
    }

    pub(crate) fn posts(&self) -> Vec<(String, serde_json::Value)> {
        self.post_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, ApiError> {
        self.get_log.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;
        if self.failing.lock().unwrap().contains(url) {
            return Err(ApiError::Transport {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(self
            .gets
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| RawResponse::new(404, "")))
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, ApiError> {
        self.post_log
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        tokio::task::yield_now().await;
        Ok(self
            .posts
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| RawResponse::new(500, "no route")))
    }
}
