// crates/api-hub-core/src/runtime/service.rs
// ============================================================================
// Module: API Hub Data Access Service
// Description: Store-backed operations with a query cache in front.
// Purpose: Assign identity, validate input, and invalidate cached reads on writes.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`HubService`] is the single entry point for reads and writes used by the
//! HTTP server and the CLI. Reads consult its [`QueryCache`] first; writes go
//! straight to the store and then invalidate exactly the affected keys.
//! Identifiers and timestamps are assigned here, never by callers.
//!
//! The cache only sees writes made through the same service. Callers whose
//! store is also written by other processes build the service with
//! [`CachePolicy::disabled`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::Access;
use crate::core::ApiKey;
use crate::core::ApiKeyId;
use crate::core::ApiKeyRequest;
use crate::core::Contract;
use crate::core::IssuedApiKey;
use crate::core::KeyError;
use crate::core::MockResponse;
use crate::core::MockResponseId;
use crate::core::MockUpsert;
use crate::core::Project;
use crate::core::ProjectId;
use crate::core::Task;
use crate::core::TaskId;
use crate::core::TaskStatus;
use crate::core::Timestamp;
use crate::core::issue_api_key;
use crate::core::verify_secret;
use crate::interfaces::HubStore;
use crate::interfaces::NewProject;
use crate::interfaces::NewTask;
use crate::interfaces::StoreError;
use crate::interfaces::TaskFilter;
use crate::interfaces::TaskPatch;
use crate::interfaces::blank_to_none;
use crate::runtime::cache::CacheKey;
use crate::runtime::cache::CachePolicy;
use crate::runtime::cache::CachedValue;
use crate::runtime::cache::Collection;
use crate::runtime::cache::QueryCache;
use crate::runtime::store::SharedHubStore;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Data access errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Input failed validation.
    #[error("invalid input: {0}")]
    Invalid(String),
    /// Referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Write conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Presented API key secret was not accepted.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Backing store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::Invalid(message) => Self::Invalid(message),
            other => Self::Store(other),
        }
    }
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Cached data access over a shared hub store.
pub struct HubService {
    /// Backing store.
    store: SharedHubStore,
    /// Read cache owned by this service.
    cache: QueryCache,
}

impl HubService {
    /// Creates a service with an empty cache under the default policy.
    #[must_use]
    pub fn new(store: SharedHubStore) -> Self {
        Self { store, cache: QueryCache::new() }
    }

    /// Creates a service whose cache follows `policy`.
    #[must_use]
    pub fn with_cache_policy(store: SharedHubStore, policy: CachePolicy) -> Self {
        Self { store, cache: QueryCache::with_policy(policy) }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &SharedHubStore {
        &self.store
    }

    /// Returns the query cache.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ------------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------------

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Invalid`] for a blank name.
    pub fn create_project(&self, input: NewProject) -> Result<Project, ServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("project name must be non-empty".to_string()));
        }
        let project = Project {
            id: ProjectId::generate(),
            name: name.to_string(),
            description: blank_to_none(input.description),
            graphql_endpoint: blank_to_none(input.graphql_endpoint),
            created_at: Timestamp::now(),
        };
        self.store.create_project(&project)?;
        self.cache.invalidate(&CacheKey::Projects);
        Ok(project)
    }

    /// Lists projects.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the store fails.
    pub fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        if let Some(CachedValue::Projects(projects)) = self.cache.get(&CacheKey::Projects) {
            return Ok(projects);
        }
        let observed = self.cache.generation();
        let projects = self.store.list_projects()?;
        self.cache.insert(CacheKey::Projects, CachedValue::Projects(projects.clone()), observed);
        Ok(projects)
    }

    /// Loads one project.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown projects.
    pub fn get_project(&self, project_id: &ProjectId) -> Result<Project, ServiceError> {
        self.store
            .get_project(project_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("project {project_id}")))
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Invalid`] for a blank title and
    /// [`ServiceError::NotFound`] for an unknown project.
    pub fn create_task(&self, input: NewTask) -> Result<Task, ServiceError> {
        let title = input.fields.title.trim();
        if title.is_empty() {
            return Err(ServiceError::Invalid("task title must be non-empty".to_string()));
        }
        let now = Timestamp::now();
        let task = Task {
            id: TaskId::generate(),
            title: title.to_string(),
            description: blank_to_none(input.fields.description),
            project_id: input.project_id,
            assignee: blank_to_none(input.fields.assignee),
            status: input.status,
            api_type: input.fields.api_type,
            priority: input.fields.priority,
            endpoint: blank_to_none(input.fields.endpoint),
            method: blank_to_none(input.fields.method),
            contract: input.fields.contract,
            created_by: blank_to_none(input.created_by),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_task(&task)?;
        self.cache.invalidate_collection(Collection::Tasks);
        Ok(task)
    }

    /// Loads one task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown tasks.
    pub fn get_task(&self, task_id: &TaskId) -> Result<Task, ServiceError> {
        self.store
            .get_task(task_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("task {task_id}")))
    }

    /// Lists tasks matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the store fails.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        let key = CacheKey::Tasks(filter.clone());
        if let Some(CachedValue::Tasks(tasks)) = self.cache.get(&key) {
            return Ok(tasks);
        }
        let observed = self.cache.generation();
        let tasks = self.store.list_tasks(filter)?;
        self.cache.insert(key, CachedValue::Tasks(tasks.clone()), observed);
        Ok(tasks)
    }

    /// Applies a partial update to a task's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown tasks and
    /// [`ServiceError::Invalid`] when the title would become blank.
    pub fn update_task(&self, task_id: &TaskId, patch: TaskPatch) -> Result<Task, ServiceError> {
        if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(ServiceError::Invalid("task title must be non-empty".to_string()));
        }
        self.write_task(task_id, |task| patch.apply(task))
    }

    /// Moves a task to a status column.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown tasks.
    pub fn set_task_status(
        &self,
        task_id: &TaskId,
        status: TaskStatus,
    ) -> Result<Task, ServiceError> {
        self.write_task(task_id, |task| task.status = status)
    }

    /// Replaces or clears a task's contract.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown tasks.
    pub fn set_contract(
        &self,
        task_id: &TaskId,
        contract: Option<Contract>,
    ) -> Result<Task, ServiceError> {
        self.write_task(task_id, |task| task.contract = contract)
    }

    /// Deletes a task and its mock responses.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown tasks.
    pub fn delete_task(&self, task_id: &TaskId) -> Result<(), ServiceError> {
        if !self.store.delete_task(task_id)? {
            return Err(ServiceError::NotFound(format!("task {task_id}")));
        }
        self.cache.invalidate_collection(Collection::Tasks);
        self.cache.invalidate_task_mocks(task_id);
        Ok(())
    }

    /// Loads, edits, stamps, and stores a task.
    fn write_task(
        &self,
        task_id: &TaskId,
        edit: impl FnOnce(&mut Task),
    ) -> Result<Task, ServiceError> {
        let mut task = self.get_task(task_id)?;
        edit(&mut task);
        task.updated_at = Timestamp::now().max(task.updated_at);
        self.store.update_task(&task)?;
        self.cache.invalidate_collection(Collection::Tasks);
        Ok(task)
    }

    // ------------------------------------------------------------------------
    // Mock responses
    // ------------------------------------------------------------------------

    /// Inserts or replaces the mock for `(task, scenario)`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Invalid`] for invalid payloads and
    /// [`ServiceError::NotFound`] for unknown tasks.
    pub fn upsert_mock(&self, upsert: MockUpsert) -> Result<MockResponse, ServiceError> {
        upsert.validate().map_err(|err| ServiceError::Invalid(err.to_string()))?;
        let now = Timestamp::now();
        let candidate = MockResponse {
            id: MockResponseId::generate(),
            task_id: upsert.task_id,
            scenario: upsert.scenario,
            status_code: upsert.status_code,
            body: upsert.body,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.upsert_mock_response(&candidate)?;
        self.cache.invalidate(&CacheKey::MockResponses(stored.task_id.clone()));
        self.cache
            .invalidate(&CacheKey::MockResponse(stored.task_id.clone(), stored.scenario.clone()));
        Ok(stored)
    }

    /// Lists a task's mocks ordered by scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the store fails.
    pub fn list_mocks(&self, task_id: &TaskId) -> Result<Vec<MockResponse>, ServiceError> {
        let key = CacheKey::MockResponses(task_id.clone());
        if let Some(CachedValue::MockResponses(mocks)) = self.cache.get(&key) {
            return Ok(mocks);
        }
        let observed = self.cache.generation();
        let mocks = self.store.list_mock_responses(task_id)?;
        self.cache.insert(key, CachedValue::MockResponses(mocks.clone()), observed);
        Ok(mocks)
    }

    /// Loads one scenario of a task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the store fails.
    pub fn get_mock(
        &self,
        task_id: &TaskId,
        scenario: &str,
    ) -> Result<Option<MockResponse>, ServiceError> {
        let key = CacheKey::MockResponse(task_id.clone(), scenario.to_string());
        if let Some(CachedValue::MockResponse(mock)) = self.cache.get(&key) {
            return Ok(mock);
        }
        let observed = self.cache.generation();
        let mock = self.store.get_mock_response(task_id, scenario)?;
        self.cache.insert(key, CachedValue::MockResponse(mock.clone()), observed);
        Ok(mock)
    }

    // ------------------------------------------------------------------------
    // API keys
    // ------------------------------------------------------------------------

    /// Issues and stores a new API key; the secret is returned once.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Invalid`] for a blank name or a grant on an
    /// unknown project.
    pub fn create_api_key(&self, request: ApiKeyRequest) -> Result<IssuedApiKey, ServiceError> {
        let issued = issue_api_key(request, Timestamp::now())
            .map_err(|err| ServiceError::Invalid(err.to_string()))?;
        for permission in &issued.key.permissions {
            if self.store.get_project(&permission.project_id)?.is_none() {
                return Err(ServiceError::Invalid(format!(
                    "permission references unknown project {}",
                    permission.project_id
                )));
            }
        }
        self.store.insert_api_key(&issued.key)?;
        self.cache.invalidate(&CacheKey::ApiKeys);
        Ok(issued)
    }

    /// Lists API keys, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the store fails.
    pub fn list_api_keys(&self) -> Result<Vec<ApiKey>, ServiceError> {
        if let Some(CachedValue::ApiKeys(keys)) = self.cache.get(&CacheKey::ApiKeys) {
            return Ok(keys);
        }
        let observed = self.cache.generation();
        let keys = self.store.list_api_keys()?;
        self.cache.insert(CacheKey::ApiKeys, CachedValue::ApiKeys(keys.clone()), observed);
        Ok(keys)
    }

    /// Revokes an API key.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown keys and
    /// [`ServiceError::Conflict`] for keys already revoked.
    pub fn revoke_api_key(&self, key_id: &ApiKeyId) -> Result<ApiKey, ServiceError> {
        let revoked = self.store.revoke_api_key(key_id, Timestamp::now())?;
        self.cache.invalidate(&CacheKey::ApiKeys);
        Ok(revoked)
    }

    /// Checks a presented secret and reports its access to one project.
    ///
    /// The key is located by display prefix and verified against the stored
    /// digest; a successful check stamps `last_used_at`. Keys are always read
    /// from the store so a revocation elsewhere takes effect at once.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unauthorized`] when no live key matches the
    /// secret and [`ServiceError::NotFound`] for an unknown project.
    pub fn authorize_api_key(
        &self,
        secret: &str,
        project_id: &ProjectId,
    ) -> Result<KeyAuthorization, ServiceError> {
        self.get_project(project_id)?;
        let mut revoked = false;
        for key in self.store.list_api_keys()? {
            if !secret.starts_with(key.key_prefix.as_str()) {
                continue;
            }
            match verify_secret(&key, secret) {
                Ok(()) => {
                    let key = self.store.record_api_key_use(&key.id, Timestamp::now())?;
                    self.cache.invalidate(&CacheKey::ApiKeys);
                    let access = key.access_for(project_id);
                    return Ok(KeyAuthorization { key, access });
                }
                Err(KeyError::Revoked) => revoked = true,
                Err(_) => {}
            }
        }
        let reason = if revoked { "api key revoked" } else { "api key not recognized" };
        Err(ServiceError::Unauthorized(reason.to_string()))
    }
}

/// Result of a successful API key check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAuthorization {
    /// Key metadata with the refreshed `last_used_at`.
    pub key: ApiKey,
    /// Access the key grants on the requested project.
    pub access: Access,
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

    use std::thread;
    use std::time::Duration;

    use serde_json::json;

    use super::HubService;
    use super::ServiceError;
    use crate::core::Access;
    use crate::core::ApiKeyRequest;
    use crate::core::MockUpsert;
    use crate::core::ProjectId;
    use crate::core::ProjectPermission;
    use crate::core::TaskStatus;
    use crate::interfaces::NewProject;
    use crate::interfaces::NewTask;
    use crate::interfaces::TaskFields;
    use crate::interfaces::TaskFilter;
    use crate::interfaces::TaskPatch;
    use crate::runtime::cache::CacheKey;
    use crate::runtime::cache::CachePolicy;
    use crate::runtime::store::InMemoryHubStore;
    use crate::runtime::store::SharedHubStore;

    fn service() -> HubService {
        HubService::new(SharedHubStore::from_store(InMemoryHubStore::new()))
    }

    fn new_task(service: &HubService, title: &str) -> crate::core::Task {
        let project = service
            .create_project(NewProject {
                name: "Billing".to_string(),
                description: None,
                graphql_endpoint: None,
            })
            .unwrap();
        service
            .create_task(NewTask {
                project_id: project.id,
                status: TaskStatus::Planning,
                created_by: None,
                fields: TaskFields { title: title.to_string(), ..TaskFields::default() },
            })
            .unwrap()
    }

    #[test]
    fn task_writes_invalidate_filtered_listings() {
        let service = service();
        let task = new_task(&service, "List invoices");
        assert_eq!(service.list_tasks(&TaskFilter::default()).unwrap().len(), 1);
        assert!(service.cache().contains(&CacheKey::Tasks(TaskFilter::default())));

        service.set_task_status(&task.id, TaskStatus::Done).unwrap();
        assert!(!service.cache().contains(&CacheKey::Tasks(TaskFilter::default())));
        let done = TaskFilter { status: Some(TaskStatus::Done), ..TaskFilter::default() };
        assert_eq!(service.list_tasks(&done).unwrap()[0].id, task.id);
    }

    #[test]
    fn blank_fields_are_stored_as_absent() {
        let service = service();
        let task = new_task(&service, "Get invoice");
        let updated = service
            .update_task(
                &task.id,
                TaskPatch {
                    endpoint: Some("/invoices/{id}".to_string()),
                    assignee: Some(String::new()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.endpoint.as_deref(), Some("/invoices/{id}"));
        assert_eq!(updated.assignee, None);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[test]
    fn mock_upsert_invalidates_scenario_keys_and_keeps_identity() {
        let service = service();
        let task = new_task(&service, "Create invoice");
        let first =
            service.upsert_mock(MockUpsert::from_template(task.id.clone(), "success")).unwrap();
        assert!(service.get_mock(&task.id, "success").unwrap().is_some());
        let second = service
            .upsert_mock(MockUpsert {
                task_id: task.id.clone(),
                scenario: "success".to_string(),
                status_code: 201,
                body: json!({"id": 1}),
            })
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        let cached = service.get_mock(&task.id, "success").unwrap().unwrap();
        assert_eq!(cached.status_code, 201);
        assert_eq!(service.list_mocks(&task.id).unwrap().len(), 1);
    }

    #[test]
    fn delete_task_cascades_and_clears_mock_cache() {
        let service = service();
        let task = new_task(&service, "Delete invoice");
        service.upsert_mock(MockUpsert::from_template(task.id.clone(), "error")).unwrap();
        assert_eq!(service.list_mocks(&task.id).unwrap().len(), 1);
        service.delete_task(&task.id).unwrap();
        assert!(service.list_mocks(&task.id).unwrap().is_empty());
        assert!(matches!(service.delete_task(&task.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn api_keys_reject_unknown_projects_and_double_revoke() {
        let service = service();
        let task = new_task(&service, "Keys");
        let unknown = ApiKeyRequest {
            name: "ci".to_string(),
            permissions: vec![ProjectPermission {
                project_id: "missing".into(),
                access: Access::Read,
            }],
            created_by: None,
        };
        assert!(matches!(service.create_api_key(unknown), Err(ServiceError::Invalid(_))));

        let issued = service
            .create_api_key(ApiKeyRequest {
                name: "ci".to_string(),
                permissions: vec![ProjectPermission {
                    project_id: task.project_id.clone(),
                    access: Access::ReadWrite,
                }],
                created_by: None,
            })
            .unwrap();
        assert_eq!(service.list_api_keys().unwrap().len(), 1);
        service.revoke_api_key(&issued.key.id).unwrap();
        assert!(service.list_api_keys().unwrap()[0].is_revoked());
        assert!(matches!(service.revoke_api_key(&issued.key.id), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn uncached_service_sees_writes_from_another_service() {
        let store = SharedHubStore::from_store(InMemoryHubStore::new());
        let server = HubService::with_cache_policy(store.clone(), CachePolicy::disabled());
        let offline = HubService::new(store);
        let task = new_task(&offline, "List orders");
        let done = TaskFilter { status: Some(TaskStatus::Done), ..TaskFilter::default() };
        assert!(server.list_tasks(&done).unwrap().is_empty());

        offline.set_task_status(&task.id, TaskStatus::Done).unwrap();
        assert_eq!(server.list_tasks(&done).unwrap()[0].id, task.id);
        assert!(server.cache().is_empty());
    }

    #[test]
    fn cached_listing_expires_after_foreign_write() {
        let store = SharedHubStore::from_store(InMemoryHubStore::new());
        let policy = CachePolicy { ttl: Duration::from_millis(20), ..CachePolicy::default() };
        let reader = HubService::with_cache_policy(store.clone(), policy);
        let writer = HubService::new(store);
        let task = new_task(&writer, "Get order");
        let all = TaskFilter::default();
        assert_eq!(reader.list_tasks(&all).unwrap()[0].status, TaskStatus::Planning);

        writer.set_task_status(&task.id, TaskStatus::Done).unwrap();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(reader.list_tasks(&all).unwrap()[0].status, TaskStatus::Done);
    }

    #[test]
    fn distinct_filters_do_not_grow_the_cache_without_bound() {
        let store = SharedHubStore::from_store(InMemoryHubStore::new());
        let policy = CachePolicy { capacity: 8, ..CachePolicy::default() };
        let service = HubService::with_cache_policy(store, policy);
        for index in 0 .. 5_000 {
            let filter = TaskFilter::project(ProjectId::new(format!("junk-{index}")));
            assert!(service.list_tasks(&filter).unwrap().is_empty());
        }
        assert!(service.cache().len() <= 8);
    }

    #[test]
    fn api_key_check_reports_access_and_stamps_last_use() {
        let service = service();
        let task = new_task(&service, "Keys");
        let issued = service
            .create_api_key(ApiKeyRequest {
                name: "deploy".to_string(),
                permissions: vec![ProjectPermission {
                    project_id: task.project_id.clone(),
                    access: Access::Read,
                }],
                created_by: None,
            })
            .unwrap();
        assert!(service.list_api_keys().unwrap()[0].last_used_at.is_none());

        let checked = service.authorize_api_key(&issued.secret, &task.project_id).unwrap();
        assert_eq!(checked.access, Access::Read);
        assert_eq!(checked.key.id, issued.key.id);
        assert!(checked.key.last_used_at.is_some());
        assert_eq!(service.list_api_keys().unwrap()[0].last_used_at, checked.key.last_used_at);

        let wrong = format!("{}zzzz", &issued.secret[.. 11]);
        assert!(matches!(
            service.authorize_api_key(&wrong, &task.project_id),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.authorize_api_key(&issued.secret, &ProjectId::new("missing")),
            Err(ServiceError::NotFound(_))
        ));

        service.revoke_api_key(&issued.key.id).unwrap();
        let err = service.authorize_api_key(&issued.secret, &task.project_id).unwrap_err();
        assert_eq!(err, ServiceError::Unauthorized("api key revoked".to_string()));
    }
}
