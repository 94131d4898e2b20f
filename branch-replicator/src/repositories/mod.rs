//! Workspace repository listing.
//!
//! Walks the paginated `/repositories/{workspace}` collection, following each
//! page's `next` link until the last page. The whole listing is materialised
//! before any repository is processed.

mod error;
mod repository;

pub use error::ListingError;
pub use repository::{Page, RepositorySummary};

use crate::client::ApiClient;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// What to do when a listing page cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingPolicy {
    /// Stop listing and keep the repositories fetched so far.
    #[default]
    Truncate,

    /// Fail the whole listing.
    Strict,
}

/// Lists every repository in `workspace`.
///
/// Under [`ListingPolicy::Truncate`] a failed page fetch (non-2xx, transport
/// error or undecodable body) ends the walk and the partial result is
/// returned. A page URL seen twice also ends the walk.
///
/// # Errors
///
/// Returns [`ListingError::Incomplete`] only under [`ListingPolicy::Strict`].
pub async fn list_repositories(
    client: &ApiClient,
    workspace: &str,
    policy: ListingPolicy,
) -> Result<Vec<RepositorySummary>, ListingError> {
    let span = info_span!("list_repositories", workspace);

    async {
        let mut repositories = Vec::new();
        let mut visited = HashSet::new();
        let mut pages = 0;
        let mut next = Some(client.endpoint(&format!("/repositories/{workspace}")));

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                warn!(url = %url, "Pagination loop detected, stopping");
                break;
            }

            let page = match client.get_json::<Page<RepositorySummary>>(&url).await {
                Ok(Some(page)) => page,
                Ok(None) => return stop(policy, url, pages, repositories),
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to fetch repository page");
                    return stop(policy, url, pages, repositories);
                }
            };

            pages += 1;
            debug!(page = pages, count = page.values.len(), "Fetched repository page");
            repositories.extend(page.values.into_iter().map(|mut repo| {
                repo.page = pages;
                repo
            }));
            next = page.next;
        }

        info!(count = repositories.len(), pages, "Listing complete");
        Ok(repositories)
    }
    .instrument(span)
    .await
}

/// Ends the walk after a failed page according to `policy`.
fn stop(
    policy: ListingPolicy,
    url: String,
    pages: usize,
    repositories: Vec<RepositorySummary>,
) -> Result<Vec<RepositorySummary>, ListingError> {
    match policy {
        ListingPolicy::Truncate => {
            if pages > 0 {
                warn!(
                    pages,
                    count = repositories.len(),
                    "Repository listing truncated"
                );
            }
            Ok(repositories)
        }
        ListingPolicy::Strict => Err(ListingError::Incomplete { url, pages }),
    }
}
