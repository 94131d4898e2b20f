//! Run configuration.
//!
//! A [`WorkspaceConfig`] is assembled once at start-up from layered sources
//! (built-in defaults of the caller, an optional TOML file, then flags) via
//! [`WorkspaceConfigBuilder::merge`], validated, and never changed afterwards.

mod error;

pub use error::ConfigError;

use crate::repositories::ListingPolicy;
use bstr::ByteSlice;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Environment variable consulted when no app password was supplied.
pub const APP_PASSWORD_ENV: &str = "BITBUCKET_APP_PASSWORD";

/// Validated settings for one replication run.
#[derive(Clone)]
pub struct WorkspaceConfig {
    workspace: String,
    username: String,
    app_password: String,
    base_url: String,
    concurrency: usize,
    source_branch: String,
    target_branch: String,
    repo_log_path: PathBuf,
    request_timeout: Duration,
    listing_policy: ListingPolicy,
}

impl std::fmt::Debug for WorkspaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConfig")
            .field("workspace", &self.workspace)
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("concurrency", &self.concurrency)
            .field("source_branch", &self.source_branch)
            .field("target_branch", &self.target_branch)
            .field("repo_log_path", &self.repo_log_path)
            .field("request_timeout", &self.request_timeout)
            .field("listing_policy", &self.listing_policy)
            .finish()
    }
}

impl WorkspaceConfig {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> WorkspaceConfigBuilder {
        WorkspaceConfigBuilder::default()
    }

    /// Returns the workspace identifier.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Returns the Basic Auth username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the Basic Auth app password.
    pub fn app_password(&self) -> &str {
        &self.app_password
    }

    /// Returns the API base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the maximum number of concurrent API requests.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the branch looked up in every repository.
    pub fn source_branch(&self) -> &str {
        &self.source_branch
    }

    /// Returns the branch created where the source branch exists.
    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    /// Returns the path the repository slug list is written to.
    pub fn repo_log_path(&self) -> &Path {
        &self.repo_log_path
    }

    /// Returns the per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns how a failed listing page is handled.
    pub fn listing_policy(&self) -> ListingPolicy {
        self.listing_policy
    }
}

/// Partially specified [`WorkspaceConfig`].
///
/// Also the schema of the optional TOML config file (kebab-case keys).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct WorkspaceConfigBuilder {
    workspace: Option<String>,
    username: Option<String>,
    app_password: Option<String>,
    base_url: Option<String>,
    concurrency: Option<usize>,
    source_branch: Option<String>,
    target_branch: Option<String>,
    repo_log_path: Option<PathBuf>,
    timeout_secs: Option<u64>,
    listing_policy: Option<ListingPolicy>,
}

impl WorkspaceConfigBuilder {
    /// Loads a builder from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Layers `other` on top of `self`; values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            workspace: other.workspace.or(self.workspace),
            username: other.username.or(self.username),
            app_password: other.app_password.or(self.app_password),
            base_url: other.base_url.or(self.base_url),
            concurrency: other.concurrency.or(self.concurrency),
            source_branch: other.source_branch.or(self.source_branch),
            target_branch: other.target_branch.or(self.target_branch),
            repo_log_path: other.repo_log_path.or(self.repo_log_path),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            listing_policy: other.listing_policy.or(self.listing_policy),
        }
    }

    /// Sets the workspace identifier.
    #[must_use]
    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Sets the Basic Auth username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the Basic Auth app password.
    #[must_use]
    pub fn app_password(mut self, app_password: impl Into<String>) -> Self {
        self.app_password = Some(app_password.into());
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the maximum number of concurrent API requests.
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Sets the branch to look up.
    #[must_use]
    pub fn source_branch(mut self, branch: impl Into<String>) -> Self {
        self.source_branch = Some(branch.into());
        self
    }

    /// Sets the branch to create.
    #[must_use]
    pub fn target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = Some(branch.into());
        self
    }

    /// Sets the repository log path.
    #[must_use]
    pub fn repo_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.repo_log_path = Some(path.into());
        self
    }

    /// Sets the per-request timeout. Sub-second precision is dropped.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Sets the listing policy.
    #[must_use]
    pub fn listing_policy(mut self, policy: ListingPolicy) -> Self {
        self.listing_policy = Some(policy);
        self
    }

    /// Validates and freezes the configuration.
    ///
    /// When no app password was set, [`APP_PASSWORD_ENV`] is read.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] for unset settings and
    /// [`ConfigError::ValidationError`] for unusable ones.
    pub fn build(self) -> Result<WorkspaceConfig, ConfigError> {
        let app_password = self
            .app_password
            .or_else(|| std::env::var(APP_PASSWORD_ENV).ok());

        let workspace = non_empty("workspace", self.workspace)?;
        let username = non_empty("username", self.username)?;
        let app_password = non_empty("app-password", app_password)?;
        let base_url = validate_base_url(&required("base-url", self.base_url)?)?;

        let concurrency = required("concurrency", self.concurrency)?;
        if concurrency == 0 {
            return Err(ConfigError::ValidationError {
                field: "concurrency",
                message: "must be at least 1".to_string(),
            });
        }

        let source_branch = required("source-branch", self.source_branch)?;
        let source_branch = validate_branch("source-branch", source_branch)?;
        let target_branch = required("target-branch", self.target_branch)?;
        let target_branch = validate_branch("target-branch", target_branch)?;
        if source_branch == target_branch {
            return Err(ConfigError::ValidationError {
                field: "target-branch",
                message: "must differ from the source branch".to_string(),
            });
        }

        let repo_log_path = required("repo-log-path", self.repo_log_path)?;
        let timeout_secs = required("timeout-secs", self.timeout_secs)?;
        if timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "timeout-secs",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(WorkspaceConfig {
            workspace,
            username,
            app_password,
            base_url,
            concurrency,
            source_branch,
            target_branch,
            repo_log_path,
            request_timeout: Duration::from_secs(timeout_secs),
            listing_policy: required("listing-policy", self.listing_policy)?,
        })
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingValue { field })
}

fn non_empty(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    let value = required(field, value)?;
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

/// Checks that `raw` is an absolute http(s) URL and strips trailing slashes.
fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::ValidationError {
        field: "base-url",
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError {
            field: "base-url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Checks that `branch` is a usable git branch name.
fn validate_branch(field: &'static str, branch: String) -> Result<String, ConfigError> {
    if branch.is_empty() {
        return Err(ConfigError::ValidationError {
            field,
            message: "must not be empty".to_string(),
        });
    }
    gix_validate::reference::name_partial(branch.as_bytes().as_bstr()).map_err(|e| {
        ConfigError::ValidationError {
            field,
            message: e.to_string(),
        }
    })?;
    Ok(branch)
}
