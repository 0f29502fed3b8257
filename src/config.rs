//! Configuration Management
//!
//! Label definitions loaded from the label directory and the GitHub settings
//! read from the environment

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Directory searched for label files when none is given
pub const DEFAULT_LABELS_DIR: &str = "labels";

/// Files whose name starts with this prefix are never loaded
pub const REMOVED_FILE_PREFIX: &str = "_remove";

/// GitHub REST API root used when no override is given
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable holding the personal access token
pub const TOKEN_ENV: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

/// Environment variable holding the repository owner
pub const REPO_OWNER_ENV: &str = "GITHUB_REPO_OWNER";

/// Environment variable holding the repository name
pub const REPO_NAME_ENV: &str = "GITHUB_REPO_NAME";

/// Labels GitHub (and common bots) create by default, removed on every run
pub const DEFAULT_LABEL_NAMES: &[&str] = &[
    "bug",
    "dependencies",
    "documentation",
    "duplicate",
    "enhancement",
    "github_actions",
    "help wanted",
    "invalid",
    "python",
    "question",
    "wontfix",
];

/// Label
///
/// A label as desired in the config or as present on the repository.
/// The name is the only identity; color and description are attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    /// Label name
    pub name: String,

    /// Label color (6-digit hexadecimal, without #, may be empty)
    #[serde(default)]
    pub color: String,

    /// Label description (may be empty)
    #[serde(default)]
    pub description: String,
}

impl Label {
    /// Create a new label, normalizing the color
    pub fn new<N, C, D>(name: N, color: C, description: D) -> Self
    where
        N: Into<String>,
        C: AsRef<str>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            color: Self::normalize_color(color.as_ref()),
            description: description.into(),
        }
    }

    /// Normalize color (remove leading #)
    pub fn normalize_color(color: &str) -> String {
        color.trim_start_matches('#').to_string()
    }

    /// Whether color or description differ from `other`
    pub fn differs_from(&self, other: &Label) -> bool {
        self.color != other.color || self.description != other.description
    }
}

/// A label record as written in a config file, before validation
#[derive(Debug, Deserialize)]
struct RawLabel {
    name: Option<String>,
    color: Option<String>,
    description: Option<String>,
}

/// A label record in a JSON file; scalars are read as their text
#[derive(Debug, Deserialize)]
struct JsonRawLabel {
    name: Option<serde_json::Value>,
    color: Option<serde_json::Value>,
    description: Option<serde_json::Value>,
}

impl TryFrom<JsonRawLabel> for RawLabel {
    type Error = serde_json::Error;

    fn try_from(record: JsonRawLabel) -> std::result::Result<Self, Self::Error> {
        Ok(RawLabel {
            name: json_scalar_text("name", record.name)?,
            color: json_scalar_text("color", record.color)?,
            description: json_scalar_text("description", record.description)?,
        })
    }
}

/// Text of a JSON scalar, the way YAML reads an unquoted scalar
fn json_scalar_text(
    field: &str,
    value: Option<serde_json::Value>,
) -> std::result::Result<Option<String>, serde_json::Error> {
    use serde::de::Error as _;
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(serde_json::Error::custom(
            format!("`{field}` must be a string, number or boolean"),
        )),
    }
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Formats in priority order; the first one with any file wins
    pub const PRIORITY: [ConfigFormat; 2] = [ConfigFormat::Yaml, ConfigFormat::Json];

    /// File extension including the dot
    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Yaml => ".yaml",
            ConfigFormat::Json => ".json",
        }
    }

    fn parse(self, content: &str) -> Result<Vec<RawLabel>> {
        let records = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str::<Vec<JsonRawLabel>>(content)?
                .into_iter()
                .map(RawLabel::try_from)
                .collect::<std::result::Result<Vec<RawLabel>, serde_json::Error>>()?,
        };
        Ok(records)
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Yaml => f.write_str("YAML"),
            ConfigFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Select the label files to load from a directory
///
/// # Arguments
/// - `dir`: Label directory
///
/// # Returns
/// The winning format and its files, sorted by file name
///
/// # Errors
/// `ConfigNotFound` if no format has an eligible file, or an IO error
/// if the directory cannot be read
pub fn select_label_files(dir: &Path) -> Result<(ConfigFormat, Vec<PathBuf>)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ConfigNotFound {
                dir: dir.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut file_names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(REMOVED_FILE_PREFIX) {
                file_names.push(name.to_string());
            }
        }
    }
    file_names.sort();

    for format in ConfigFormat::PRIORITY {
        let selected: Vec<PathBuf> = file_names
            .iter()
            .filter(|name| name.ends_with(format.extension()))
            .map(|name| dir.join(name))
            .collect();

        if !selected.is_empty() {
            return Ok((format, selected));
        }
    }

    Err(Error::ConfigNotFound {
        dir: dir.to_path_buf(),
    })
}

/// Parse and normalize the labels of one config file
///
/// # Arguments
/// - `content`: Raw file content
/// - `format`: Format of the content
/// - `file_name`: File name reported in diagnostics
///
/// # Errors
/// If parsing fails or a record has no name
pub fn parse_labels(content: &str, format: ConfigFormat, file_name: &str) -> Result<Vec<Label>> {
    let records = format.parse(content)?;
    let mut labels = Vec::with_capacity(records.len());

    for (i, record) in records.into_iter().enumerate() {
        let name = match record.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(Error::InvalidLabelEntry {
                    file: file_name.to_string(),
                    index: i + 1,
                    color: record.color.unwrap_or_else(|| "(none)".to_string()),
                    description: record.description.unwrap_or_else(|| "(none)".to_string()),
                });
            }
        };

        labels.push(Label::new(
            name,
            record.color.unwrap_or_default(),
            record.description.unwrap_or_default(),
        ));
    }

    Ok(labels)
}

/// Load the desired labels from a label directory
///
/// YAML files take priority; JSON files are only read when no YAML file
/// exists. Labels keep file order and in-file order.
///
/// # Errors
/// If no config file exists, a file cannot be read or parsed, or a record
/// has no name
pub fn load_labels_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Label>> {
    let (format, files) = select_label_files(dir.as_ref())?;
    info!("Found {format} files. Loading labels from {format} config.");

    let mut labels = Vec::new();
    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Loading labels from {file_name}.");

        let content = std::fs::read_to_string(&path)?;
        labels.extend(parse_labels(&content, format, &file_name)?);
    }

    Ok(labels)
}

/// GitHub Settings
///
/// Connection settings built once at startup from the environment
#[derive(Clone)]
pub struct GithubSettings {
    /// Personal access token
    pub access_token: String,

    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// REST API root
    pub api_url: String,
}

impl GithubSettings {
    /// Read settings from the process environment
    ///
    /// # Errors
    /// `MissingEnvironment` naming the first unset variable
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::MissingEnvironment(key.to_string()))
        };

        Ok(Self {
            access_token: require(TOKEN_ENV)?,
            owner: require(REPO_OWNER_ENV)?,
            repo: require(REPO_NAME_ENV)?,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Replace the REST API root
    pub fn with_api_url<S: Into<String>>(mut self, api_url: S) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Repository in "owner/repo" form
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Debug for GithubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubSettings")
            .field("access_token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .finish()
    }
}
