//! gh-label-setup CLI
//!
//! Command line tool setting up GitHub issue labels from a config directory

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gh_label_setup::config::{DEFAULT_API_URL, DEFAULT_LABELS_DIR};
use gh_label_setup::GithubSettings;

/// gh-label-setup CLI
///
/// Reads the repository and token from GITHUB_REPO_OWNER, GITHUB_REPO_NAME
/// and GITHUB_PERSONAL_ACCESS_TOKEN (a `.env` file is honored).
#[derive(Parser, Debug)]
#[command(
    name = "gh-label-setup",
    version,
    about = "Set up GitHub issue labels from a YAML or JSON config",
    long_about = "Deletes GitHub's default labels, then creates or updates labels to match \
    the YAML (preferred) or JSON files in the labels directory."
)]
struct Cli {
    /// Directory holding the label files
    #[arg(long, default_value = DEFAULT_LABELS_DIR)]
    labels_dir: PathBuf,

    /// GitHub REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(warning) = dotenv_warning(&dotenv) {
        warn!("{warning}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Install the global subscriber; RUST_LOG overrides the default level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Warning for a `.env` file that exists but could not be loaded
fn dotenv_warning<T>(result: &dotenvy::Result<T>) -> Option<String> {
    match result {
        Err(err) if !err.not_found() => Some(format!("Failed to load .env file: {err}")),
        _ => None,
    }
}

/// Execute synchronization
async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = GithubSettings::from_env()?.with_api_url(cli.api_url);
    info!("Setting up labels for {}.", settings.repository());

    let result = gh_label_setup::sync_repository_labels(&settings, &cli.labels_dir)
        .await
        .with_context(|| format!("Label setup for {} aborted", settings.repository()))?;

    if result.has_changes() {
        info!(
            created = result.created,
            updated = result.updated,
            deleted = result.deleted,
            "{} label(s) processed.",
            result.total_operations()
        );
    } else {
        info!("No changes required.");
    }
    if !result.errors.is_empty() {
        info!(
            "{} label operation(s) failed; see the errors above.",
            result.errors.len()
        );
    }
    info!("Label creation process completed.");

    Ok(())
}
