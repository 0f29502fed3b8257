//! Label Synchronization Functionality
//!
//! Module reconciling the desired labels with the labels on the repository

use std::path::Path;

use tracing::{debug, error, info};

use crate::config::{load_labels_from_dir, Label, DEFAULT_LABEL_NAMES};
use crate::error::{Error, Result};
use crate::github::LabelService;

/// Types of label synchronization operations
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOperation {
    /// Create a label
    Create { label: Label },

    /// Update a label
    Update {
        current_name: String,
        new_label: Label,
        changes: Vec<String>,
    },

    /// Delete a default label
    Delete { name: String },

    /// No change
    NoChange { name: String },
}

impl SyncOperation {
    /// Name of the label the operation applies to
    pub fn name(&self) -> &str {
        match self {
            SyncOperation::Create { label } => &label.name,
            SyncOperation::Update { current_name, .. } => current_name,
            SyncOperation::Delete { name } | SyncOperation::NoChange { name } => name,
        }
    }

    fn action(&self) -> &'static str {
        match self {
            SyncOperation::Create { .. } => "create",
            SyncOperation::Update { .. } => "update",
            SyncOperation::Delete { .. } => "delete",
            SyncOperation::NoChange { .. } => "keep",
        }
    }
}

/// Synchronization result
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    /// Operations that completed
    pub operations: Vec<SyncOperation>,

    /// Number of labels created
    pub created: u32,

    /// Number of labels updated
    pub updated: u32,

    /// Number of labels deleted
    pub deleted: u32,

    /// Number of labels unchanged
    pub unchanged: u32,

    /// Operations that encountered errors
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Create a new empty synchronization result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation and update statistics
    pub fn add_operation(&mut self, operation: SyncOperation) {
        match &operation {
            SyncOperation::Create { .. } => self.created += 1,
            SyncOperation::Update { .. } => self.updated += 1,
            SyncOperation::Delete { .. } => self.deleted += 1,
            SyncOperation::NoChange { .. } => self.unchanged += 1,
        }
        self.operations.push(operation);
    }

    /// Add an error
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Whether any change was applied
    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0 || self.deleted > 0
    }

    /// Get total number of completed operations
    pub fn total_operations(&self) -> u32 {
        self.created + self.updated + self.deleted + self.unchanged
    }
}

/// Label Synchronization Engine
///
/// Holds one snapshot of the remote labels and one of the desired labels.
/// The remote snapshot is not refreshed between the deletion phase and the
/// create/update phase.
pub struct LabelSyncer<S> {
    service: S,
    remote_labels: Vec<Label>,
    desired_labels: Vec<Label>,
}

impl<S: LabelService> LabelSyncer<S> {
    /// Create a synchronization engine from existing snapshots
    pub fn new(service: S, remote_labels: Vec<Label>, desired_labels: Vec<Label>) -> Self {
        Self {
            service,
            remote_labels,
            desired_labels,
        }
    }

    /// Fetch the remote labels, then load the desired labels from `labels_dir`
    ///
    /// # Errors
    /// Returns an error if listing the remote labels or loading the config fails
    pub async fn load<P: AsRef<Path>>(service: S, labels_dir: P) -> Result<Self> {
        let remote_labels = service.fetch_all_labels().await?;
        let desired_labels = load_labels_from_dir(labels_dir)?;

        Ok(Self::new(service, remote_labels, desired_labels))
    }

    /// Synchronize labels
    ///
    /// Deletes the default labels, then creates or updates every desired
    /// label. Failures of single labels are collected, never returned.
    pub async fn sync_labels(&self) -> SyncResult {
        let mut result = SyncResult::new();

        self.delete_default_labels(&mut result).await;
        self.create_labels(&mut result).await;

        debug!(
            created = result.created,
            updated = result.updated,
            deleted = result.deleted,
            unchanged = result.unchanged,
            failed = result.errors.len(),
            "Label synchronization finished"
        );

        result
    }

    /// Delete every default label present on the repository
    pub async fn delete_default_labels(&self, result: &mut SyncResult) {
        for operation in self.plan_deletions() {
            self.apply(operation, result).await;
        }
    }

    /// Create or update every desired label
    pub async fn create_labels(&self, result: &mut SyncResult) {
        for operation in self.plan_upserts() {
            self.apply(operation, result).await;
        }
    }

    /// Plan the deletion of default labels
    ///
    /// # Returns
    /// One delete per default name found in the remote snapshot, in the
    /// order of [`DEFAULT_LABEL_NAMES`]
    pub fn plan_deletions(&self) -> Vec<SyncOperation> {
        DEFAULT_LABEL_NAMES
            .iter()
            .filter(|name| self.remote_labels.iter().any(|label| label.name == **name))
            .map(|name| SyncOperation::Delete {
                name: name.to_string(),
            })
            .collect()
    }

    /// Plan creates and updates
    ///
    /// # Returns
    /// One operation per desired label, in config order
    pub fn plan_upserts(&self) -> Vec<SyncOperation> {
        self.desired_labels
            .iter()
            .map(|desired| {
                match self
                    .remote_labels
                    .iter()
                    .find(|remote| remote.name == desired.name)
                {
                    Some(current) => check_label_changes(current, desired),
                    None => SyncOperation::Create {
                        label: desired.clone(),
                    },
                }
            })
            .collect()
    }

    /// Execute one operation and record its outcome
    async fn apply(&self, operation: SyncOperation, result: &mut SyncResult) {
        match self.execute_operation(&operation).await {
            Ok(()) => {
                match &operation {
                    SyncOperation::Create { label } => {
                        info!("Label `{}` created successfully.", label.name)
                    }
                    SyncOperation::Update {
                        current_name,
                        changes,
                        ..
                    } => info!(
                        changes = %changes.join(", "),
                        "Label `{current_name}` updated successfully."
                    ),
                    SyncOperation::Delete { name } => {
                        info!("Label `{name}` deleted successfully.")
                    }
                    SyncOperation::NoChange { name } => debug!("Label `{name}` is up to date."),
                }
                result.add_operation(operation);
            }
            Err(e) => {
                let message = match e {
                    Error::UnexpectedStatus { .. } => e.to_string(),
                    other => format!(
                        "Failed to {} label `{}`: {other}",
                        operation.action(),
                        operation.name()
                    ),
                };
                error!("{message}");
                result.add_error(message);
            }
        }
    }

    /// Execute an operation
    ///
    /// # Errors
    /// Returns an error if the remote rejects the operation
    async fn execute_operation(&self, operation: &SyncOperation) -> Result<()> {
        match operation {
            SyncOperation::Create { label } => self.service.create_label(label).await,
            SyncOperation::Update {
                current_name,
                new_label,
                ..
            } => self.service.update_label(current_name, new_label).await,
            SyncOperation::Delete { name } => self.service.delete_label(name).await,
            SyncOperation::NoChange { .. } => Ok(()),
        }
    }
}

/// Check label changes
///
/// # Arguments
/// - `current`: Label on the repository
/// - `target`: Desired label with the same name
///
/// # Returns
/// `Update` listing the changed attributes, or `NoChange`
fn check_label_changes(current: &Label, target: &Label) -> SyncOperation {
    if !target.differs_from(current) {
        return SyncOperation::NoChange {
            name: current.name.clone(),
        };
    }

    let mut changes = Vec::new();
    if current.color != target.color {
        changes.push(format!("color: {} -> {}", current.color, target.color));
    }
    if current.description != target.description {
        changes.push(format!(
            "description: {} -> {}",
            current.description, target.description
        ));
    }

    SyncOperation::Update {
        current_name: current.name.clone(),
        new_label: target.clone(),
        changes,
    }
}
