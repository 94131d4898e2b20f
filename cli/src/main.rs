//! CLI for the Branch Replicator.
//!
//! Creates a branch in every repository of a Bitbucket workspace that has
//! the given source branch, pointing it at the same commit.

use branch_replicator::{
    ListingPolicy, RunReport, Runner, RunnerError, WorkspaceConfig, WorkspaceConfigBuilder,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/2.0";
const DEFAULT_CONCURRENCY: usize = 50;
const DEFAULT_REPO_LOG: &str = "all_repos.txt";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Branch Replicator - Create a branch across every repository in a Bitbucket workspace.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional TOML config file. Flags override values from the file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bitbucket workspace ID.
    #[arg(long, env = "BITBUCKET_WORKSPACE")]
    workspace: Option<String>,

    /// Bitbucket username.
    #[arg(long, env = "BITBUCKET_USERNAME")]
    username: Option<String>,

    /// Bitbucket app password.
    #[arg(long, env = "BITBUCKET_APP_PASSWORD", hide_env_values = true)]
    app_password: Option<String>,

    /// Branch to look up in every repository.
    #[arg(long)]
    source_branch: Option<String>,

    /// Branch to create from the source branch.
    #[arg(long)]
    target_branch: Option<String>,

    /// Maximum concurrent API requests [default: 50].
    #[arg(long)]
    concurrency: Option<usize>,

    /// File the repository slug list is written to [default: all_repos.txt].
    #[arg(long)]
    repo_log: Option<PathBuf>,

    /// Bitbucket API base URL [default: https://api.bitbucket.org/2.0].
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds [default: 30].
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Abort the run if any repository listing page fails to load.
    #[arg(long)]
    strict_listing: bool,
}

impl Args {
    /// Converts the flags that were given into a config layer.
    fn into_layer(self) -> WorkspaceConfigBuilder {
        let mut layer = WorkspaceConfig::builder();
        if let Some(workspace) = self.workspace {
            layer = layer.workspace(workspace);
        }
        if let Some(username) = self.username {
            layer = layer.username(username);
        }
        if let Some(app_password) = self.app_password {
            layer = layer.app_password(app_password);
        }
        if let Some(branch) = self.source_branch {
            layer = layer.source_branch(branch);
        }
        if let Some(branch) = self.target_branch {
            layer = layer.target_branch(branch);
        }
        if let Some(concurrency) = self.concurrency {
            layer = layer.concurrency(concurrency);
        }
        if let Some(path) = self.repo_log {
            layer = layer.repo_log_path(path);
        }
        if let Some(base_url) = self.base_url {
            layer = layer.base_url(base_url);
        }
        if let Some(secs) = self.timeout_secs {
            layer = layer.request_timeout(Duration::from_secs(secs));
        }
        if self.strict_listing {
            layer = layer.listing_policy(ListingPolicy::Strict);
        }
        layer
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(report) => {
            print_summary(&report);
            // Per-repository failures are reported above, not through the exit code.
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Built-in values used when neither the config file nor a flag sets them.
fn defaults() -> WorkspaceConfigBuilder {
    WorkspaceConfig::builder()
        .base_url(DEFAULT_BASE_URL)
        .concurrency(DEFAULT_CONCURRENCY)
        .repo_log_path(DEFAULT_REPO_LOG)
        .request_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .listing_policy(ListingPolicy::Truncate)
}

/// Resolves the layered configuration: defaults, then file, then flags.
fn resolve_config(args: Args) -> Result<WorkspaceConfig, RunnerError> {
    let mut layers = defaults();
    if let Some(path) = &args.config {
        layers = layers.merge(WorkspaceConfigBuilder::from_toml_file(path)?);
    }
    Ok(layers.merge(args.into_layer()).build()?)
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunReport, RunnerError> {
    let config = resolve_config(args)?;
    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(report: &RunReport) {
    let summary = &report.summary;
    println!("\nSummary:");
    println!("  Repositories listed: {}", summary.repositories_listed);
    println!("  Branches created: {}", summary.created);
    println!("  Already existed: {}", summary.already_existed);
    println!("  Source branch missing: {}", summary.source_missing);
    println!("  Failed: {}", summary.failed);

    if summary.has_failures() {
        println!("\nFailures:");
        for result in report.results.iter().filter(|r| r.outcome.is_failure()) {
            println!("  {result}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "branch-replicator",
            "--workspace",
            "acme",
            "--username",
            "ci-bot",
            "--app-password",
            "s3cret",
            "--source-branch",
            "main",
            "--target-branch",
            "main-copy",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn applies_defaults() {
        let config = resolve_config(parse(&[])).unwrap();

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.repo_log_path(), std::path::Path::new(DEFAULT_REPO_LOG));
        assert_eq!(config.listing_policy(), ListingPolicy::Truncate);
    }

    #[test]
    fn flags_override_defaults() {
        let config = resolve_config(parse(&[
            "--concurrency",
            "7",
            "--timeout-secs",
            "5",
            "--strict-listing",
        ]))
        .unwrap();

        assert_eq!(config.concurrency(), 7);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.listing_policy(), ListingPolicy::Strict);
    }

    #[test]
    fn missing_config_file_is_critical() {
        let result = resolve_config(parse(&["--config", "/nonexistent/replicator.toml"]));
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }
}
