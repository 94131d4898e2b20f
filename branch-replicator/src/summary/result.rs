//! Processing result types.

use super::outcome::OperationOutcome;
use serde::Serialize;
use std::fmt;

/// Result of processing a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryResult {
    /// Repository slug.
    pub slug: String,
    /// Branch that was probed.
    pub source_branch: String,
    /// Branch that was (or would have been) created.
    pub target_branch: String,
    /// How processing ended.
    pub outcome: OperationOutcome,
}

impl fmt::Display for RepositoryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            OperationOutcome::Created => {
                write!(f, "Branch '{}' created in {}", self.target_branch, self.slug)
            }
            OperationOutcome::AlreadyExists => write!(
                f,
                "Branch '{}' already exists in {}",
                self.target_branch, self.slug
            ),
            OperationOutcome::SourceBranchMissing => write!(
                f,
                "Source branch '{}' not found in {}, skipping",
                self.source_branch, self.slug
            ),
            OperationOutcome::Failed {
                reason,
                status_code: Some(status),
            } => write!(
                f,
                "Failed to create branch in {}: {status} - {reason}",
                self.slug
            ),
            OperationOutcome::Failed {
                reason,
                status_code: None,
            } => write!(f, "Failed to create branch in {}: {reason}", self.slug),
        }
    }
}
