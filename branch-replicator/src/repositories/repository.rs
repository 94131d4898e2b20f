//! Listed repository and page types.

use serde::{Deserialize, Serialize};

/// A repository returned by the workspace listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository slug, unique within the workspace.
    pub slug: String,

    /// Full name in "workspace/slug" format.
    #[serde(default)]
    pub full_name: String,

    /// 1-based index of the listing page this repository came from.
    #[serde(skip_deserializing, default)]
    pub page: usize,
}

/// One page of a paginated Bitbucket collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,

    /// Absolute URL of the next page, absent or null on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_without_next_is_last() {
        let page: Page<RepositorySummary> = serde_json::from_value(json!({
            "values": [{"slug": "a", "full_name": "acme/a", "is_private": true}],
            "pagelen": 10
        }))
        .unwrap();

        assert_eq!(page.values.len(), 1);
        assert_eq!(page.values[0].slug, "a");
        assert_eq!(page.values[0].full_name, "acme/a");
        assert!(page.next.is_none());
    }

    #[test]
    fn null_next_and_missing_values_are_tolerated() {
        let page: Page<RepositorySummary> =
            serde_json::from_value(json!({"next": null})).unwrap();
        assert!(page.values.is_empty());
        assert!(page.next.is_none());
    }
}
