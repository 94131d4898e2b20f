//! Branch lookup and creation.
//!
//! [`probe_branch`] fetches a branch tip from one repository and
//! [`create_branch`] points a new branch at that commit. Neither returns an
//! error: lookup failures read as "branch missing" and creation failures are
//! classified into an [`OperationOutcome`].

mod branch_ref;

pub use branch_ref::{BranchRef, CommitTarget, CreateBranchRequest};

use crate::client::ApiClient;
use crate::summary::OperationOutcome;
use tracing::{debug, warn};

/// Body fragment Bitbucket uses when a branch name is already taken.
const DUPLICATE_BRANCH_MARKER: &str = "already exists";

/// Looks up `branch` in `repo_slug`.
///
/// Returns `Some` only for an exact `200` response with a decodable body. A
/// `404`, any other status, a transport error and a malformed body all return
/// `None`, so "absent" and "could not check" look the same to the caller.
pub async fn probe_branch(
    client: &ApiClient,
    workspace: &str,
    repo_slug: &str,
    branch: &str,
) -> Option<BranchRef> {
    let url = client.endpoint(&format!(
        "/repositories/{workspace}/{repo_slug}/refs/branches/{branch}"
    ));

    let response = match client.get_raw(&url).await {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %url, error = %e, "Branch lookup failed");
            return None;
        }
    };

    if response.status != 200 {
        debug!(url = %url, status = response.status, "Branch not available");
        return None;
    }

    match serde_json::from_str::<BranchRef>(&response.body) {
        Ok(branch_ref) => Some(branch_ref),
        Err(e) => {
            warn!(url = %url, error = %e, "Unexpected branch payload");
            None
        }
    }
}

/// Creates `new_branch` in `repo_slug` pointing at the commit of `source`.
pub async fn create_branch(
    client: &ApiClient,
    workspace: &str,
    repo_slug: &str,
    new_branch: &str,
    source: &BranchRef,
) -> OperationOutcome {
    let url = client.endpoint(&format!(
        "/repositories/{workspace}/{repo_slug}/refs/branches"
    ));
    let request = CreateBranchRequest::new(new_branch, source);
    debug!(url = %url, hash = %source.hash, "Creating branch");

    match client.post(&url, &request).await {
        Ok((status, body)) => classify_creation(status, &body),
        Err(e) => OperationOutcome::Failed {
            reason: e.to_string(),
            status_code: None,
        },
    }
}

/// Classifies a create-branch response.
///
/// `201` is success. A `400` whose body mentions [`DUPLICATE_BRANCH_MARKER`]
/// is a benign duplicate. Anything else is a failure carrying the body text.
/// Matching on the body wording is fragile; this is the only place it happens.
#[must_use]
pub fn classify_creation(status: u16, body: &str) -> OperationOutcome {
    match status {
        201 => OperationOutcome::Created,
        400 if body.contains(DUPLICATE_BRANCH_MARKER) => OperationOutcome::AlreadyExists,
        _ => OperationOutcome::Failed {
            reason: body.to_string(),
            status_code: Some(status),
        },
    }
}
