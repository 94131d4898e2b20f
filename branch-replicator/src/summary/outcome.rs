//! Per-repository outcome types.

use serde::Serialize;

/// Terminal classification of one repository's branch creation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The target branch was created.
    Created,

    /// The target branch was already present.
    AlreadyExists,

    /// The source branch was not found, or could not be fetched.
    SourceBranchMissing,

    /// Branch creation was rejected or never got a response.
    Failed {
        /// Response body, or the transport error message.
        reason: String,
        /// HTTP status, absent when no response was received.
        status_code: Option<u16>,
    },
}

impl OperationOutcome {
    /// Returns the outcome as a short lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AlreadyExists => "already_exists",
            Self::SourceBranchMissing => "source_branch_missing",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns true for [`OperationOutcome::Failed`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
