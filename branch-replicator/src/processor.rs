//! Per-repository processing: look up the source branch, then create the
//! target branch from it.

use crate::branches::{create_branch, probe_branch};
use crate::client::ApiClient;
use crate::config::WorkspaceConfig;
use crate::repositories::RepositorySummary;
use crate::summary::{OperationOutcome, RepositoryResult};
use tracing::{info, info_span, warn, Instrument};

/// Processes one repository and reports how it ended.
///
/// The source branch lookup always completes before any creation request is
/// sent. Nothing is retried; every failure is folded into the returned
/// [`OperationOutcome`].
pub async fn process_repository(
    client: &ApiClient,
    config: &WorkspaceConfig,
    repository: &RepositorySummary,
) -> RepositoryResult {
    let span = info_span!("repository", repo = %repository.slug);

    async {
        info!("Processing repository");

        let outcome = match probe_branch(
            client,
            config.workspace(),
            &repository.slug,
            config.source_branch(),
        )
        .await
        {
            Some(source) => {
                create_branch(
                    client,
                    config.workspace(),
                    &repository.slug,
                    config.target_branch(),
                    &source,
                )
                .await
            }
            None => OperationOutcome::SourceBranchMissing,
        };

        let result = RepositoryResult {
            slug: repository.slug.clone(),
            source_branch: config.source_branch().to_string(),
            target_branch: config.target_branch().to_string(),
            outcome,
        };

        if result.outcome.is_failure() {
            warn!("{result}");
        } else {
            info!("{result}");
        }
        result
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeTransport;
    use crate::rate_gate::RateGate;
    use crate::repositories::ListingPolicy;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const BASE: &str = "https://api.test/2.0";

    fn config() -> WorkspaceConfig {
        WorkspaceConfig::builder()
            .workspace("acme")
            .username("ci-bot")
            .app_password("s3cret")
            .base_url(BASE)
            .concurrency(4)
            .source_branch("main")
            .target_branch("main-copy")
            .repo_log_path("all_repos.txt")
            .request_timeout(Duration::from_secs(30))
            .listing_policy(ListingPolicy::Truncate)
            .build()
            .unwrap()
    }

    fn repo(slug: &str) -> RepositorySummary {
        RepositorySummary {
            slug: slug.to_string(),
            full_name: format!("acme/{slug}"),
            page: 1,
        }
    }

    #[tokio::test]
    async fn missing_source_skips_creation() {
        let transport = Arc::new(FakeTransport::new());
        let client = ApiClient::new(transport.clone(), RateGate::new(4), BASE);

        let result = process_repository(&client, &config(), &repo("web")).await;

        assert_eq!(result.outcome, OperationOutcome::SourceBranchMissing);
        assert!(transport.posts().is_empty());
    }

    #[tokio::test]
    async fn found_source_is_copied() {
        let transport = Arc::new(FakeTransport::new());
        transport.on_get(
            &format!("{BASE}/repositories/acme/web/refs/branches/main"),
            200,
            json!({"name": "main", "target": {"hash": "abc123"}}).to_string(),
        );
        transport.on_post(
            &format!("{BASE}/repositories/acme/web/refs/branches"),
            400,
            "Branch with name main-copy already exists",
        );
        let client = ApiClient::new(transport.clone(), RateGate::new(4), BASE);

        let result = process_repository(&client, &config(), &repo("web")).await;

        assert_eq!(result.outcome, OperationOutcome::AlreadyExists);
        assert_eq!(result.slug, "web");
        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].1, json!({"name": "main-copy", "target": {"hash": "abc123"}}));
    }
}
