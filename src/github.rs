//! GitHub API Client
//!
//! Module for managing interactions with the GitHub labels API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::config::{GithubSettings, Label};
use crate::error::{Error, Result};

/// Page size requested from the labels endpoint
pub const PER_PAGE: u32 = 100;

/// REST API version sent with every request
pub const API_VERSION: &str = "2022-11-28";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// GitHub Label Information
///
/// Represents label information retrieved from the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubLabel {
    /// Label name
    pub name: String,

    /// Label color (6-digit hexadecimal, without #)
    pub color: String,

    /// Label description
    pub description: Option<String>,
}

impl From<GitHubLabel> for Label {
    fn from(github_label: GitHubLabel) -> Self {
        Label {
            name: github_label.name,
            color: github_label.color,
            description: github_label.description.unwrap_or_default(),
        }
    }
}

/// Body of a label update request
#[derive(Debug, Serialize)]
struct UpdateLabelRequest<'a> {
    new_name: &'a str,
    color: &'a str,
    description: &'a str,
}

/// Remote label store
///
/// Every mutation succeeds only on its expected status code; anything else is
/// reported as [`Error::UnexpectedStatus`].
#[async_trait]
pub trait LabelService: Send + Sync {
    /// Fetch one page of labels (1-based)
    async fn list_labels_page(&self, page: u32, per_page: u32) -> Result<Vec<Label>>;

    /// Create a label
    async fn create_label(&self, label: &Label) -> Result<()>;

    /// Update the label currently named `current_name`
    async fn update_label(&self, current_name: &str, label: &Label) -> Result<()>;

    /// Delete a label by name
    async fn delete_label(&self, name: &str) -> Result<()>;

    /// Get all labels from the repository
    ///
    /// Pages are requested until one comes back empty.
    ///
    /// # Errors
    /// Any failed page, or a page repeating the previous one
    async fn fetch_all_labels(&self) -> Result<Vec<Label>> {
        info!("Fetching list of github labels.");

        let mut labels = Vec::new();
        let mut previous_page: Vec<Label> = Vec::new();
        let mut page = 1u32;

        loop {
            info!("Fetching page {page}.");
            let items = self.list_labels_page(page, PER_PAGE).await?;

            if items.is_empty() {
                break;
            }
            if items == previous_page {
                return Err(Error::PaginationStalled { page });
            }

            labels.extend(items.iter().cloned());
            previous_page = items;
            page += 1;
        }

        Ok(labels)
    }
}

/// GitHub API Client
///
/// Talks to `{api_url}/repos/{owner}/{repo}/labels`
pub struct GitHubClient {
    http: reqwest::Client,
    labels_url: Url,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// # Arguments
    /// - `settings`: Token, repository and API root
    ///
    /// # Errors
    /// Returns an error if the API URL or token is unusable
    pub fn new(settings: &GithubSettings) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", settings.access_token))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            labels_url: labels_url(&settings.api_url, &settings.owner, &settings.repo)?,
        })
    }

    /// URL of a single label, with the name encoded as one path segment
    fn label_url(&self, name: &str) -> Url {
        let mut url = self.labels_url.clone();
        // labels_url is a base URL, checked in `labels_url`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(name);
        }
        url
    }
}

/// Build the labels endpoint for a repository
fn labels_url(api_url: &str, owner: &str, repo: &str) -> Result<Url> {
    let mut url = Url::parse(api_url)?;
    url.path_segments_mut()
        .map_err(|_| Error::ApiUrlNotBase(api_url.to_string()))?
        .pop_if_empty()
        .extend(["repos", owner, repo, "labels"]);
    Ok(url)
}

#[async_trait]
impl LabelService for GitHubClient {
    async fn list_labels_page(&self, page: u32, per_page: u32) -> Result<Vec<Label>> {
        let mut url = self.labels_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());

        let response = self.http.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(Error::RemoteFetch {
                status: response.status().as_u16(),
                page,
            });
        }

        let labels: Vec<GitHubLabel> = response.json().await?;
        Ok(labels.into_iter().map(Label::from).collect())
    }

    async fn create_label(&self, label: &Label) -> Result<()> {
        let response = self
            .http
            .post(self.labels_url.clone())
            .json(label)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(Error::unexpected_status("create", &label.name, status.as_u16())),
        }
    }

    async fn update_label(&self, current_name: &str, label: &Label) -> Result<()> {
        let body = UpdateLabelRequest {
            new_name: &label.name,
            color: &label.color,
            description: &label.description,
        };
        let response = self
            .http
            .patch(self.label_url(current_name))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(Error::unexpected_status("update", &label.name, status.as_u16())),
        }
    }

    async fn delete_label(&self, name: &str) -> Result<()> {
        let response = self.http.delete(self.label_url(name)).send().await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(Error::unexpected_status("delete", name, status.as_u16())),
        }
    }
}
