// crates/api-hub-core/src/runtime/store.rs
// ============================================================================
// Module: API Hub In-Memory Store
// Description: Simple in-memory hub store for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`HubStore`] for tests
//! and local demos, plus [`SharedHubStore`], a clonable wrapper around any
//! store. The in-memory store keeps every table behind one mutex so cascade
//! deletes are atomic. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::ApiKey;
use crate::core::ApiKeyId;
use crate::core::MockResponse;
use crate::core::Project;
use crate::core::ProjectId;
use crate::core::Task;
use crate::core::TaskId;
use crate::core::Timestamp;
use crate::interfaces::HubStore;
use crate::interfaces::StoreError;
use crate::interfaces::TaskFilter;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Tables held by the in-memory store.
#[derive(Debug, Default)]
struct HubTables {
    /// Projects by id.
    projects: BTreeMap<ProjectId, Project>,
    /// Tasks by id.
    tasks: BTreeMap<TaskId, Task>,
    /// Mock responses by `(task, scenario)`; iteration is scenario-ordered per task.
    mocks: BTreeMap<(TaskId, String), MockResponse>,
    /// API keys by id.
    keys: BTreeMap<ApiKeyId, ApiKey>,
}

/// In-memory hub store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHubStore {
    /// Table set protected by a mutex.
    tables: Arc<Mutex<HubTables>>,
}

impl InMemoryHubStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the table set.
    fn lock(&self) -> Result<MutexGuard<'_, HubTables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Store("hub store mutex poisoned".to_string()))
    }
}

impl HubStore for InMemoryHubStore {
    fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.projects.contains_key(&project.id) {
            return Err(StoreError::Conflict(format!("project {} already exists", project.id)));
        }
        tables.projects.insert(project.id.clone(), project.clone());
        drop(tables);
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects: Vec<Project> = self.lock()?.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }

    fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.lock()?.projects.get(project_id).cloned())
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.projects.contains_key(&task.project_id) {
            return Err(StoreError::NotFound(format!("project {}", task.project_id)));
        }
        if tables.tasks.contains_key(&task.id) {
            return Err(StoreError::Conflict(format!("task {} already exists", task.id)));
        }
        tables.tasks.insert(task.id.clone(), task.clone());
        drop(tables);
        Ok(())
    }

    fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.projects.contains_key(&task.project_id) {
            return Err(StoreError::NotFound(format!("project {}", task.project_id)));
        }
        let Some(slot) = tables.tasks.get_mut(&task.id) else {
            return Err(StoreError::NotFound(format!("task {}", task.id)));
        };
        *slot = task.clone();
        drop(tables);
        Ok(())
    }

    fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.lock()?.tasks.get(task_id).cloned())
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = {
            let tables = self.lock()?;
            tables.tasks.values().filter(|task| filter.matches(task)).cloned().collect()
        };
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    fn delete_task(&self, task_id: &TaskId) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        if tables.tasks.remove(task_id).is_none() {
            return Ok(false);
        }
        tables.mocks.retain(|(owner, _), _| owner != task_id);
        drop(tables);
        Ok(true)
    }

    fn upsert_mock_response(&self, candidate: &MockResponse) -> Result<MockResponse, StoreError> {
        let mut tables = self.lock()?;
        if !tables.tasks.contains_key(&candidate.task_id) {
            return Err(StoreError::NotFound(format!("task {}", candidate.task_id)));
        }
        let key = (candidate.task_id.clone(), candidate.scenario.clone());
        let stored = match tables.mocks.get(&key) {
            Some(existing) => MockResponse {
                id: existing.id.clone(),
                created_at: existing.created_at,
                ..candidate.clone()
            },
            None => candidate.clone(),
        };
        tables.mocks.insert(key, stored.clone());
        drop(tables);
        Ok(stored)
    }

    fn get_mock_response(
        &self,
        task_id: &TaskId,
        scenario: &str,
    ) -> Result<Option<MockResponse>, StoreError> {
        let key = (task_id.clone(), scenario.to_string());
        Ok(self.lock()?.mocks.get(&key).cloned())
    }

    fn list_mock_responses(&self, task_id: &TaskId) -> Result<Vec<MockResponse>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.mocks.values().filter(|mock| &mock.task_id == task_id).cloned().collect())
    }

    fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.keys.contains_key(&key.id) {
            return Err(StoreError::Conflict(format!("api key {} already exists", key.id)));
        }
        tables.keys.insert(key.id.clone(), key.clone());
        drop(tables);
        Ok(())
    }

    fn list_api_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        let mut keys: Vec<ApiKey> = self.lock()?.keys.values().cloned().collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(keys)
    }

    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>, StoreError> {
        Ok(self.lock()?.keys.get(key_id).cloned())
    }

    fn revoke_api_key(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError> {
        let mut tables = self.lock()?;
        let Some(key) = tables.keys.get_mut(key_id) else {
            return Err(StoreError::NotFound(format!("api key {key_id}")));
        };
        if key.revoked_at.is_some() {
            return Err(StoreError::Conflict(format!("api key {key_id} already revoked")));
        }
        key.revoked_at = Some(at);
        let revoked = key.clone();
        drop(tables);
        Ok(revoked)
    }

    fn record_api_key_use(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError> {
        let mut tables = self.lock()?;
        let Some(key) = tables.keys.get_mut(key_id) else {
            return Err(StoreError::NotFound(format!("api key {key_id}")));
        };
        key.last_used_at = Some(at);
        let used = key.clone();
        drop(tables);
        Ok(used)
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared hub store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedHubStore {
    /// Inner store implementation.
    inner: Arc<dyn HubStore + Send + Sync>,
}

impl SharedHubStore {
    /// Wraps a hub store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl HubStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn HubStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl HubStore for SharedHubStore {
    fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        self.inner.create_project(project)
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.inner.list_projects()
    }

    fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StoreError> {
        self.inner.get_project(project_id)
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.inner.insert_task(task)
    }

    fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        self.inner.update_task(task)
    }

    fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError> {
        self.inner.get_task(task_id)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.inner.list_tasks(filter)
    }

    fn delete_task(&self, task_id: &TaskId) -> Result<bool, StoreError> {
        self.inner.delete_task(task_id)
    }

    fn upsert_mock_response(&self, candidate: &MockResponse) -> Result<MockResponse, StoreError> {
        self.inner.upsert_mock_response(candidate)
    }

    fn get_mock_response(
        &self,
        task_id: &TaskId,
        scenario: &str,
    ) -> Result<Option<MockResponse>, StoreError> {
        self.inner.get_mock_response(task_id, scenario)
    }

    fn list_mock_responses(&self, task_id: &TaskId) -> Result<Vec<MockResponse>, StoreError> {
        self.inner.list_mock_responses(task_id)
    }

    fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError> {
        self.inner.insert_api_key(key)
    }

    fn list_api_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        self.inner.list_api_keys()
    }

    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>, StoreError> {
        self.inner.get_api_key(key_id)
    }

    fn revoke_api_key(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError> {
        self.inner.revoke_api_key(key_id, at)
    }

    fn record_api_key_use(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError> {
        self.inner.record_api_key_use(key_id, at)
    }
}
