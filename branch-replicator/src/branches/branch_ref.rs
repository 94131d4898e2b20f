//! Branch reference wire types.

use serde::{Deserialize, Serialize};

/// A branch tip as returned by the branch lookup endpoint.
///
/// This is a snapshot; the remote branch may have moved by the time it is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BranchPayload")]
pub struct BranchRef {
    /// Branch name.
    pub name: String,
    /// Commit hash the branch points at.
    pub hash: String,
}

#[derive(Deserialize)]
struct BranchPayload {
    #[serde(default)]
    name: String,
    target: CommitTarget,
}

impl From<BranchPayload> for BranchRef {
    fn from(payload: BranchPayload) -> Self {
        Self {
            name: payload.name,
            hash: payload.target.hash,
        }
    }
}

/// The `target` object of a branch, reduced to its commit hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTarget {
    /// Commit hash.
    pub hash: String,
}

/// Body of a create-branch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBranchRequest {
    /// Name of the branch to create.
    pub name: String,
    /// Commit the new branch points at.
    pub target: CommitTarget,
}

impl CreateBranchRequest {
    /// Builds a request pointing `name` at the commit of `source`.
    pub fn new(name: impl Into<String>, source: &BranchRef) -> Self {
        Self {
            name: name.into(),
            target: CommitTarget {
                hash: source.hash.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_hash_from_target() {
        let branch: BranchRef = serde_json::from_value(json!({
            "name": "main",
            "type": "branch",
            "target": {"hash": "abc123", "type": "commit", "date": "2024-01-01T00:00:00+00:00"}
        }))
        .unwrap();

        assert_eq!(
            branch,
            BranchRef {
                name: "main".to_string(),
                hash: "abc123".to_string()
            }
        );
    }

    #[test]
    fn missing_target_is_rejected() {
        let result = serde_json::from_value::<BranchRef>(json!({"name": "main"}));
        assert!(result.is_err());
    }

    #[test]
    fn request_body_shape() {
        let source = BranchRef {
            name: "main".to_string(),
            hash: "abc123".to_string(),
        };
        let body = serde_json::to_value(CreateBranchRequest::new("copy", &source)).unwrap();
        assert_eq!(body, json!({"name": "copy", "target": {"hash": "abc123"}}));
    }
}
