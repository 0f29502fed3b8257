//! Error Handling
//!
//! Error type definitions used in gh-label-setup

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gh-label-setup
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(#[from] url::ParseError),

    #[error("API URL cannot be used as a base for repository paths: {0}")]
    ApiUrlNotBase(String),

    #[error("Access token cannot be sent as a header: {0}")]
    InvalidAccessToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("{0} environment variable not set.")]
    MissingEnvironment(String),

    #[error("No YAML or JSON config file for labels in {}.", .dir.display())]
    ConfigNotFound { dir: PathBuf },

    #[error(
        "Error on {file}. Name not found on `Label #{index}` with color `{color}` and description `{description}`."
    )]
    InvalidLabelEntry {
        file: String,
        index: usize,
        color: String,
        description: String,
    },

    #[error("Status {status}. Failed to fetch list of github labels (page {page}).")]
    RemoteFetch { status: u16, page: u32 },

    #[error("Page {page} repeated the previous page of labels; refusing to paginate further.")]
    PaginationStalled { page: u32 },

    #[error("Status {status}. Failed to {action} label `{label}`.")]
    UnexpectedStatus {
        action: &'static str,
        label: String,
        status: u16,
    },
}

impl Error {
    /// Create a new unexpected-status error for a label mutation
    pub fn unexpected_status<S: Into<String>>(action: &'static str, label: S, status: u16) -> Self {
        Error::UnexpectedStatus {
            action,
            label: label.into(),
            status,
        }
    }
}
