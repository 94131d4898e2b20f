//! Run summary types and helpers.

mod outcome;
mod result;
mod run_summary;

pub use outcome::OperationOutcome;
pub use result::RepositoryResult;
pub use run_summary::{RunReport, RunSummary};
