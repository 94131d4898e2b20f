//! Run summary types.

use super::outcome::OperationOutcome;
use super::result::RepositoryResult;
use serde::Serialize;

/// Counts of outcomes across a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of repositories returned by the listing.
    pub repositories_listed: usize,

    /// Number of branches created.
    pub created: usize,

    /// Number of repositories where the branch already existed.
    pub already_existed: usize,

    /// Number of repositories skipped because the source branch was missing.
    pub source_missing: usize,

    /// Number of repositories where creation failed.
    pub failed: usize,
}

impl RunSummary {
    /// Creates a new empty summary for a listing of `repositories_listed`.
    #[must_use]
    pub fn new(repositories_listed: usize) -> Self {
        Self {
            repositories_listed,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record(&mut self, result: &RepositoryResult) {
        match result.outcome {
            OperationOutcome::Created => self.created += 1,
            OperationOutcome::AlreadyExists => self.already_existed += 1,
            OperationOutcome::SourceBranchMissing => self.source_missing += 1,
            OperationOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns the number of repositories with a recorded outcome.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.created + self.already_existed + self.source_missing + self.failed
    }

    /// Returns true if any creation failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Everything a run produced: totals plus one result per listed repository,
/// in listing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Aggregated counts.
    pub summary: RunSummary,

    /// Per-repository results.
    pub results: Vec<RepositoryResult>,
}

impl RunReport {
    /// Builds a report from the results of a run over `repositories_listed`.
    #[must_use]
    pub fn from_results(repositories_listed: usize, results: Vec<RepositoryResult>) -> Self {
        let mut summary = RunSummary::new(repositories_listed);
        for result in &results {
            summary.record(result);
        }
        Self { summary, results }
    }

    /// Returns the outcome recorded for `slug`, if it was processed.
    #[must_use]
    pub fn outcome_for(&self, slug: &str) -> Option<&OperationOutcome> {
        self.results
            .iter()
            .find(|result| result.slug == slug)
            .map(|result| &result.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(slug: &str, outcome: OperationOutcome) -> RepositoryResult {
        RepositoryResult {
            slug: slug.to_string(),
            source_branch: "main".to_string(),
            target_branch: "copy".to_string(),
            outcome,
        }
    }

    #[test]
    fn can_record_result() {
        let mut summary = RunSummary::new(2);

        summary.record(&result("a", OperationOutcome::Created));
        summary.record(&result("b", OperationOutcome::SourceBranchMissing));

        assert_eq!(summary.created, 1);
        assert_eq!(summary.source_missing, 1);
        assert_eq!(summary.processed(), 2);
        assert!(!summary.has_failures());
    }

    #[test]
    fn report_counts_every_outcome() {
        let report = RunReport::from_results(
            4,
            vec![
                result("a", OperationOutcome::Created),
                result("b", OperationOutcome::AlreadyExists),
                result("c", OperationOutcome::SourceBranchMissing),
                result(
                    "d",
                    OperationOutcome::Failed {
                        reason: "denied".to_string(),
                        status_code: Some(403),
                    },
                ),
            ],
        );

        assert_eq!(report.summary.processed(), 4);
        assert_eq!(report.summary.already_existed, 1);
        assert!(report.summary.has_failures());
        assert_eq!(
            report.outcome_for("b"),
            Some(&OperationOutcome::AlreadyExists)
        );
        assert_eq!(report.outcome_for("zzz"), None);
    }
}
