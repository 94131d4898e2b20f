#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod branches;
pub mod client;
pub mod config;
pub mod processor;
pub mod rate_gate;
pub mod repositories;
pub mod runner;
pub mod summary;

pub use branches::{
    classify_creation, create_branch, probe_branch, BranchRef, CreateBranchRequest,
};
pub use client::{ApiClient, ApiError, RawResponse, ReqwestTransport, Transport};
pub use config::{ConfigError, WorkspaceConfig, WorkspaceConfigBuilder, APP_PASSWORD_ENV};
pub use processor::process_repository;
pub use rate_gate::{GateClosed, GatePermit, RateGate};
pub use repositories::{list_repositories, ListingError, ListingPolicy, Page, RepositorySummary};
pub use runner::{Runner, RunnerError};
pub use summary::{OperationOutcome, RepositoryResult, RunReport, RunSummary};
