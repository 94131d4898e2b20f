//! Orchestrates a full replication run.

mod error;

pub use error::RunnerError;

use crate::client::{ApiClient, ReqwestTransport, Transport};
use crate::config::WorkspaceConfig;
use crate::processor::process_repository;
use crate::rate_gate::RateGate;
use crate::repositories::{list_repositories, RepositorySummary};
use crate::summary::RunReport;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs listing, logging and per-repository processing for one workspace.
#[derive(Debug)]
pub struct Runner {
    config: WorkspaceConfig,
    client: ApiClient,
}

impl Runner {
    /// Builds a runner talking to the configured API over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Client`] if the HTTP client cannot be built.
    pub fn new(config: WorkspaceConfig) -> Result<Self, RunnerError> {
        let transport = ReqwestTransport::new(
            config.username(),
            config.app_password(),
            config.request_timeout(),
        )?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Builds a runner on top of an existing transport.
    pub fn with_transport(config: WorkspaceConfig, transport: Arc<dyn Transport>) -> Self {
        let gate = RateGate::new(config.concurrency());
        let client = ApiClient::new(transport, gate, config.base_url());
        Self { config, client }
    }

    /// Returns the configuration of this run.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Executes the full orchestration flow.
    ///
    /// Every listed repository is written to the repository log and then
    /// processed exactly once. All repositories are processed concurrently;
    /// the shared rate gate is the only limit on in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] only for failures before processing starts:
    /// a strict-mode listing failure or an unwritable repository log.
    pub async fn run(&self) -> Result<RunReport, RunnerError> {
        info!(workspace = %self.config.workspace(), "Fetching repositories");
        let repositories = list_repositories(
            &self.client,
            self.config.workspace(),
            self.config.listing_policy(),
        )
        .await?;
        info!(count = repositories.len(), "Found repositories");

        write_repo_log(self.config.repo_log_path(), &repositories).await?;

        if repositories.is_empty() {
            warn!("No repositories to process");
        }

        let results = join_all(
            repositories
                .iter()
                .map(|repository| process_repository(&self.client, &self.config, repository)),
        )
        .await;

        Ok(RunReport::from_results(repositories.len(), results))
    }
}

/// Overwrites `path` with one repository slug per line.
async fn write_repo_log(
    path: &Path,
    repositories: &[RepositorySummary],
) -> Result<(), RunnerError> {
    let contents = repositories
        .iter()
        .map(|repository| repository.slug.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    tokio::fs::write(path, contents)
        .await
        .map_err(|source| RunnerError::RepoLog {
            path: path.display().to_string(),
            source,
        })?;
    info!(path = %path.display(), "Wrote repository log");
    Ok(())
}
