//! # gh-label-setup
//!
//! Set up the issue labels of a GitHub repository from a config directory
//!
//! ## Features
//! - Removal of GitHub's default labels
//! - Creation and update of labels from YAML or JSON files, keyed by name
//! - Per-label failures are logged and never stop the run

pub mod config;
pub mod error;
pub mod github;
pub mod sync;

use std::path::Path;

pub use config::{GithubSettings, Label};
pub use error::{Error, Result};
pub use github::{GitHubClient, LabelService};
pub use sync::LabelSyncer;

/// Main functionality of gh-label-setup
///
/// Fetches the repository labels, loads the desired labels from
/// `labels_dir`, deletes the default labels and creates or updates the rest.
///
/// # Examples
///
/// ```rust,no_run
/// use gh_label_setup::GithubSettings;
///
/// #[tokio::main]
/// async fn main() -> gh_label_setup::Result<()> {
///     let settings = GithubSettings::from_env()?;
///     let result = gh_label_setup::sync_repository_labels(&settings, "labels").await?;
///
///     println!("Sync completed: {:?}", result);
///     Ok(())
/// }
/// ```
///
/// # Errors
/// Returns an error only for fatal conditions: an unusable client, a failed
/// label listing, or an invalid config. Per-label failures are in the result.
pub async fn sync_repository_labels<P: AsRef<Path>>(
    settings: &GithubSettings,
    labels_dir: P,
) -> Result<sync::SyncResult> {
    let client = GitHubClient::new(settings)?;
    let syncer = LabelSyncer::load(client, labels_dir).await?;
    Ok(syncer.sync_labels().await)
}
