// crates/api-hub-core/src/interfaces/mod.rs
// ============================================================================
// Module: API Hub Interfaces
// Description: Backend-agnostic storage interface and write payloads.
// Purpose: Define the contract surfaces used by the API Hub runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! [`HubStore`] is the single persistence seam. Implementations receive fully
//! formed records (identifiers and timestamps already assigned) and must fail
//! closed on missing or invalid data. Payload types in this module describe
//! caller input before the runtime assigns identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::ApiKey;
use crate::core::ApiKeyId;
use crate::core::ApiType;
use crate::core::Contract;
use crate::core::MockResponse;
use crate::core::Priority;
use crate::core::Project;
use crate::core::ProjectId;
use crate::core::Task;
use crate::core::TaskId;
use crate::core::TaskStatus;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Hub store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("hub store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("hub store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("hub store version mismatch: {0}")]
    VersionMismatch(String),
    /// Input or stored data is invalid.
    #[error("hub store invalid data: {0}")]
    Invalid(String),
    /// Referenced record does not exist.
    #[error("hub store record not found: {0}")]
    NotFound(String),
    /// Write conflicts with existing state.
    #[error("hub store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("hub store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Hub Store
// ============================================================================

/// Persistence for projects, tasks, mock responses, and API keys.
pub trait HubStore {
    /// Inserts a project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier already exists.
    fn create_project(&self, project: &Project) -> Result<(), StoreError>;

    /// Lists projects ordered by name, then identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Loads a project.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// Inserts a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the project does not exist and
    /// [`StoreError::Conflict`] when the task identifier already exists.
    fn insert_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Replaces a stored task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the task does not exist.
    fn update_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Loads a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError>;

    /// Lists tasks matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Deletes a task and every mock response attached to it.
    ///
    /// Returns `false` when no such task existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_task(&self, task_id: &TaskId) -> Result<bool, StoreError>;

    /// Inserts or replaces the mock response for `(task_id, scenario)`.
    ///
    /// On replace, the stored identifier and creation time are kept and the
    /// status, body, and update time come from `candidate`. Returns the row as
    /// stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the task does not exist.
    fn upsert_mock_response(&self, candidate: &MockResponse) -> Result<MockResponse, StoreError>;

    /// Loads the mock response for `(task_id, scenario)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_mock_response(
        &self,
        task_id: &TaskId,
        scenario: &str,
    ) -> Result<Option<MockResponse>, StoreError>;

    /// Lists a task's mock responses ordered by scenario.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_mock_responses(&self, task_id: &TaskId) -> Result<Vec<MockResponse>, StoreError>;

    /// Inserts API key metadata.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the identifier already exists.
    fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError>;

    /// Lists API keys, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_api_keys(&self) -> Result<Vec<ApiKey>, StoreError>;

    /// Loads API key metadata.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>, StoreError>;

    /// Marks a key revoked at `at` and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown keys and
    /// [`StoreError::Conflict`] when the key is already revoked.
    fn revoke_api_key(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError>;

    /// Stamps `last_used_at` on a key and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown keys.
    fn record_api_key_use(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError>;
}

// ============================================================================
// SECTION: Task Filter
// ============================================================================

/// Optional equality filters for task listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Restrict to one project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Restrict to one status column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Restrict to one priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Returns a filter matching every task of one project.
    #[must_use]
    pub const fn project(project_id: ProjectId) -> Self {
        Self { project_id: Some(project_id), status: None, priority: None }
    }

    /// Returns true when the task satisfies every set filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.project_id.as_ref().is_none_or(|project_id| &task.project_id == project_id)
            && self.status.is_none_or(|status| task.status == status)
            && self.priority.is_none_or(|priority| task.priority == priority)
    }
}

// ============================================================================
// SECTION: Write Payloads
// ============================================================================

/// Input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional base endpoint URL.
    #[serde(default)]
    pub graphql_endpoint: Option<String>,
}

/// Editable task fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    /// Title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional assignee.
    #[serde(default)]
    pub assignee: Option<String>,
    /// API kind.
    #[serde(default)]
    pub api_type: ApiType,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Optional endpoint path.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional HTTP method.
    #[serde(default)]
    pub method: Option<String>,
    /// Optional contract.
    #[serde(default)]
    pub contract: Option<Contract>,
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    /// Owning project.
    pub project_id: ProjectId,
    /// Initial column; defaults to planning.
    #[serde(default)]
    pub status: TaskStatus,
    /// Optional creator label.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Editable fields.
    #[serde(flatten)]
    pub fields: TaskFields,
}

/// Partial update of editable task fields.
///
/// Absent fields are left unchanged. For optional text fields an empty
/// string clears the value. A `contract` of JSON `null` clears the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// New API kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// New method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// New contract, or `null` to clear.
    #[serde(default, deserialize_with = "present_value", skip_serializing_if = "Option::is_none")]
    pub contract: Option<Value>,
}

impl TaskPatch {
    /// Applies the patch to a task in place.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = blank_to_none(Some(description));
        }
        if let Some(assignee) = self.assignee {
            task.assignee = blank_to_none(Some(assignee));
        }
        if let Some(api_type) = self.api_type {
            task.api_type = api_type;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(endpoint) = self.endpoint {
            task.endpoint = blank_to_none(Some(endpoint));
        }
        if let Some(method) = self.method {
            task.method = blank_to_none(Some(method));
        }
        match self.contract {
            None => {}
            Some(Value::Null) => task.contract = None,
            Some(value) => task.contract = Some(Contract::new(value)),
        }
    }

    /// Returns true when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.api_type.is_none()
            && self.priority.is_none()
            && self.endpoint.is_none()
            && self.method.is_none()
            && self.contract.is_none()
    }
}

/// Maps blank text to `None`.
#[must_use]
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Deserializes a present field as `Some`, keeping JSON `null` distinct from absence.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use serde_json::json;

    use super::NewTask;
    use super::TaskPatch;
    use crate::core::ApiType;
    use crate::core::Priority;
    use crate::core::TaskStatus;

    #[test]
    fn new_task_defaults_match_create_form() {
        let task: NewTask =
            serde_json::from_value(json!({"project_id": "p1", "title": "List users"})).unwrap();
        assert_eq!(task.status, TaskStatus::Planning);
        assert_eq!(task.fields.api_type, ApiType::Rest);
        assert_eq!(task.fields.priority, Priority::P2);
        assert_eq!(task.fields.title, "List users");
    }

    #[test]
    fn patch_distinguishes_null_contract_from_absent() {
        let absent: TaskPatch = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert!(absent.contract.is_none());
        let cleared: TaskPatch = serde_json::from_value(json!({"contract": null})).unwrap();
        assert_eq!(cleared.contract, Some(serde_json::Value::Null));
        assert!(!cleared.is_empty());
        assert!(TaskPatch::default().is_empty());
    }
}
