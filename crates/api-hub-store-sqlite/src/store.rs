// crates/api-hub-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Hub Store
// Description: Durable HubStore backed by SQLite.
// Purpose: Persist hub records with cascading deletes and fail-closed decoding.
// Dependencies: api-hub-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`HubStore`] using `SQLite`. Every
//! operation runs on one mutex-guarded connection; multi-step writes run in a
//! transaction so existence checks and writes observe the same snapshot.
//! Timestamps are stored as unix milliseconds so `ORDER BY` matches the
//! in-memory ordering. Contracts, mock bodies, and permission lists are stored
//! as JSON text.
//! Security posture: stored rows are untrusted; unknown enum labels, bad JSON,
//! and out-of-range numbers surface as corruption instead of being coerced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use api_hub_core::ApiKey;
use api_hub_core::ApiKeyId;
use api_hub_core::ApiType;
use api_hub_core::Contract;
use api_hub_core::HubStore;
use api_hub_core::MockResponse;
use api_hub_core::MockResponseId;
use api_hub_core::Priority;
use api_hub_core::Project;
use api_hub_core::ProjectId;
use api_hub_core::ProjectPermission;
use api_hub_core::StoreError;
use api_hub_core::Task;
use api_hub_core::TaskFilter;
use api_hub_core::TaskId;
use api_hub_core::TaskStatus;
use api_hub_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
pub const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Column list for task queries.
const TASK_COLUMNS: &str = "id, title, description, project_id, assignee, status, api_type, \
                            priority, endpoint, method, contract_json, created_by, created_at, \
                            updated_at";
/// Column list for mock response queries.
const MOCK_COLUMNS: &str =
    "id, task_id, scenario, status_code, body_json, created_at, updated_at";
/// Column list for API key queries.
const KEY_COLUMNS: &str = "id, name, key_prefix, key_hash, permissions_json, created_by, \
                           created_at, last_used_at, revoked_at";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` hub store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Returns a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding contract or mock body payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row cannot be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store configuration or input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Referenced row does not exist.
    #[error("sqlite store not found: {0}")]
    NotFound(String),
    /// Write conflicts with an existing row.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

/// Maps an engine error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err function pointer.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed hub store.
///
/// # Invariants
/// - `SQLite` connection access is serialized through a mutex.
/// - Foreign keys are enforced on every connection.
#[derive(Clone)]
pub struct SqliteHubStore {
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteHubStore {
    /// Opens an `SQLite`-backed hub store, creating the schema when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when it carries an unsupported schema version.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard.execute_batch("SELECT 1").map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Locks the connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Runs `operation` inside a transaction and commits on success.
    fn with_transaction<T>(
        &self,
        operation: impl FnOnce(&Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let value = operation(&tx)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(value)
    }
}

impl HubStore for SqliteHubStore {
    fn create_project(&self, project: &Project) -> Result<(), StoreError> {
        self.with_transaction(|tx| {
            if row_exists(tx, "SELECT 1 FROM projects WHERE id = ?1", project.id.as_str())? {
                return Err(SqliteStoreError::Conflict(format!(
                    "project {} already exists",
                    project.id
                )));
            }
            tx.execute(
                "INSERT INTO projects (id, name, description, graphql_endpoint, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project.id.as_str(),
                    project.name,
                    project.description,
                    project.graphql_endpoint,
                    project.created_at.unix_millis()
                ],
            )
            .map_err(db_error)?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let guard = self.lock()?;
        let rows = query_rows(
            &guard,
            "SELECT id, name, description, graphql_endpoint, created_at FROM projects ORDER BY \
             name ASC, id ASC",
            params![],
            ProjectRow::read,
        )?;
        drop(guard);
        rows.into_iter().map(ProjectRow::decode).collect::<Result<_, _>>().map_err(Into::into)
    }

    fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                "SELECT id, name, description, graphql_endpoint, created_at FROM projects WHERE \
                 id = ?1",
                params![project_id.as_str()],
                ProjectRow::read,
            )
            .optional()
            .map_err(db_error)?;
        drop(guard);
        row.map(ProjectRow::decode).transpose().map_err(Into::into)
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let contract_json = encode_contract(task.contract.as_ref())?;
        self.with_transaction(|tx| {
            if !row_exists(tx, "SELECT 1 FROM projects WHERE id = ?1", task.project_id.as_str())? {
                return Err(SqliteStoreError::NotFound(format!("project {}", task.project_id)));
            }
            if row_exists(tx, "SELECT 1 FROM tasks WHERE id = ?1", task.id.as_str())? {
                return Err(SqliteStoreError::Conflict(format!(
                    "task {} already exists",
                    task.id
                )));
            }
            tx.execute(
                &format!(
                    "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, \
                     ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params![
                    task.id.as_str(),
                    task.title,
                    task.description,
                    task.project_id.as_str(),
                    task.assignee,
                    task.status.as_str(),
                    task.api_type.as_str(),
                    task.priority.as_str(),
                    task.endpoint,
                    task.method,
                    contract_json,
                    task.created_by,
                    task.created_at.unix_millis(),
                    task.updated_at.unix_millis()
                ],
            )
            .map_err(db_error)?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let contract_json = encode_contract(task.contract.as_ref())?;
        self.with_transaction(|tx| {
            if !row_exists(tx, "SELECT 1 FROM projects WHERE id = ?1", task.project_id.as_str())? {
                return Err(SqliteStoreError::NotFound(format!("project {}", task.project_id)));
            }
            let changed = tx
                .execute(
                    "UPDATE tasks SET title = ?2, description = ?3, project_id = ?4, assignee = \
                     ?5, status = ?6, api_type = ?7, priority = ?8, endpoint = ?9, method = ?10, \
                     contract_json = ?11, created_by = ?12, created_at = ?13, updated_at = ?14 \
                     WHERE id = ?1",
                    params![
                        task.id.as_str(),
                        task.title,
                        task.description,
                        task.project_id.as_str(),
                        task.assignee,
                        task.status.as_str(),
                        task.api_type.as_str(),
                        task.priority.as_str(),
                        task.endpoint,
                        task.method,
                        contract_json,
                        task.created_by,
                        task.created_at.unix_millis(),
                        task.updated_at.unix_millis()
                    ],
                )
                .map_err(db_error)?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("task {}", task.id)));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get_task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![task_id.as_str()],
                TaskRow::read,
            )
            .optional()
            .map_err(db_error)?;
        drop(guard);
        row.map(TaskRow::decode).transpose().map_err(Into::into)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let guard = self.lock()?;
        let rows = query_rows(
            &guard,
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE (?1 IS NULL OR project_id = ?1) AND (?2 \
                 IS NULL OR status = ?2) AND (?3 IS NULL OR priority = ?3) ORDER BY created_at \
                 DESC, id ASC"
            ),
            params![
                filter.project_id.as_ref().map(ProjectId::as_str),
                filter.status.map(TaskStatus::as_str),
                filter.priority.map(Priority::as_str)
            ],
            TaskRow::read,
        )?;
        drop(guard);
        rows.into_iter().map(TaskRow::decode).collect::<Result<_, _>>().map_err(Into::into)
    }

    fn delete_task(&self, task_id: &TaskId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let deleted = guard
            .execute("DELETE FROM tasks WHERE id = ?1", params![task_id.as_str()])
            .map_err(db_error)?;
        drop(guard);
        Ok(deleted > 0)
    }

    fn upsert_mock_response(&self, candidate: &MockResponse) -> Result<MockResponse, StoreError> {
        let body_json = serde_json::to_string(&candidate.body)
            .map_err(|err| SqliteStoreError::Invalid(format!("mock body: {err}")))?;
        self.with_transaction(|tx| {
            if !row_exists(tx, "SELECT 1 FROM tasks WHERE id = ?1", candidate.task_id.as_str())? {
                return Err(SqliteStoreError::NotFound(format!("task {}", candidate.task_id)));
            }
            let existing: Option<(String, i64)> = tx
                .query_row(
                    "SELECT id, created_at FROM mock_responses WHERE task_id = ?1 AND scenario = \
                     ?2",
                    params![candidate.task_id.as_str(), candidate.scenario],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(db_error)?;
            let stored = match existing {
                Some((id, created_at)) => MockResponse {
                    id: MockResponseId::new(id),
                    created_at: decode_timestamp(created_at, "mock_responses.created_at")?,
                    ..candidate.clone()
                },
                None => candidate.clone(),
            };
            tx.execute(
                &format!(
                    "INSERT INTO mock_responses ({MOCK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
                     ?7) ON CONFLICT(task_id, scenario) DO UPDATE SET status_code = \
                     excluded.status_code, body_json = excluded.body_json, updated_at = \
                     excluded.updated_at"
                ),
                params![
                    stored.id.as_str(),
                    stored.task_id.as_str(),
                    stored.scenario,
                    i64::from(stored.status_code),
                    body_json,
                    stored.created_at.unix_millis(),
                    stored.updated_at.unix_millis()
                ],
            )
            .map_err(db_error)?;
            Ok(stored)
        })
        .map_err(StoreError::from)
    }

    fn get_mock_response(
        &self,
        task_id: &TaskId,
        scenario: &str,
    ) -> Result<Option<MockResponse>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {MOCK_COLUMNS} FROM mock_responses WHERE task_id = ?1 AND scenario = \
                     ?2"
                ),
                params![task_id.as_str(), scenario],
                MockRow::read,
            )
            .optional()
            .map_err(db_error)?;
        drop(guard);
        row.map(MockRow::decode).transpose().map_err(Into::into)
    }

    fn list_mock_responses(&self, task_id: &TaskId) -> Result<Vec<MockResponse>, StoreError> {
        let guard = self.lock()?;
        let rows = query_rows(
            &guard,
            &format!(
                "SELECT {MOCK_COLUMNS} FROM mock_responses WHERE task_id = ?1 ORDER BY scenario \
                 ASC"
            ),
            params![task_id.as_str()],
            MockRow::read,
        )?;
        drop(guard);
        rows.into_iter().map(MockRow::decode).collect::<Result<_, _>>().map_err(Into::into)
    }

    fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError> {
        let permissions_json = serde_json::to_string(&key.permissions)
            .map_err(|err| SqliteStoreError::Invalid(format!("permissions: {err}")))?;
        self.with_transaction(|tx| {
            if row_exists(tx, "SELECT 1 FROM api_keys WHERE id = ?1", key.id.as_str())? {
                return Err(SqliteStoreError::Conflict(format!(
                    "api key {} already exists",
                    key.id
                )));
            }
            tx.execute(
                &format!(
                    "INSERT INTO api_keys ({KEY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, \
                     ?9)"
                ),
                params![
                    key.id.as_str(),
                    key.name,
                    key.key_prefix,
                    key.key_hash,
                    permissions_json,
                    key.created_by,
                    key.created_at.unix_millis(),
                    key.last_used_at.map(|at| at.unix_millis()),
                    key.revoked_at.map(|at| at.unix_millis())
                ],
            )
            .map_err(db_error)?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn list_api_keys(&self) -> Result<Vec<ApiKey>, StoreError> {
        let guard = self.lock()?;
        let rows = query_rows(
            &guard,
            &format!("SELECT {KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC, id ASC"),
            params![],
            KeyRow::read,
        )?;
        drop(guard);
        rows.into_iter().map(KeyRow::decode).collect::<Result<_, _>>().map_err(Into::into)
    }

    fn get_api_key(&self, key_id: &ApiKeyId) -> Result<Option<ApiKey>, StoreError> {
        let guard = self.lock()?;
        let row = fetch_key_row(&guard, key_id)?;
        drop(guard);
        row.map(KeyRow::decode).transpose().map_err(Into::into)
    }

    fn revoke_api_key(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError> {
        self.with_transaction(|tx| {
            let Some(row) = fetch_key_row(tx, key_id)? else {
                return Err(SqliteStoreError::NotFound(format!("api key {key_id}")));
            };
            if row.revoked_at.is_some() {
                return Err(SqliteStoreError::Conflict(format!("api key {key_id} already revoked")));
            }
            tx.execute(
                "UPDATE api_keys SET revoked_at = ?2 WHERE id = ?1",
                params![key_id.as_str(), at.unix_millis()],
            )
            .map_err(db_error)?;
            let mut key = row.decode()?;
            key.revoked_at = Some(at);
            Ok(key)
        })
        .map_err(StoreError::from)
    }

    fn record_api_key_use(&self, key_id: &ApiKeyId, at: Timestamp) -> Result<ApiKey, StoreError> {
        self.with_transaction(|tx| {
            let Some(row) = fetch_key_row(tx, key_id)? else {
                return Err(SqliteStoreError::NotFound(format!("api key {key_id}")));
            };
            tx.execute(
                "UPDATE api_keys SET last_used_at = ?2 WHERE id = ?1",
                params![key_id.as_str(), at.unix_millis()],
            )
            .map_err(db_error)?;
            let mut key = row.decode()?;
            key.last_used_at = Some(at);
            Ok(key)
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Raw project row.
struct ProjectRow {
    /// `id` column.
    id: String,
    /// `name` column.
    name: String,
    /// `description` column.
    description: Option<String>,
    /// `graphql_endpoint` column.
    graphql_endpoint: Option<String>,
    /// `created_at` column (unix ms).
    created_at: i64,
}

impl ProjectRow {
    /// Reads the raw columns.
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            graphql_endpoint: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Decodes into a project.
    fn decode(self) -> Result<Project, SqliteStoreError> {
        Ok(Project {
            id: ProjectId::new(self.id),
            name: self.name,
            description: self.description,
            graphql_endpoint: self.graphql_endpoint,
            created_at: decode_timestamp(self.created_at, "projects.created_at")?,
        })
    }
}

/// Raw task row.
struct TaskRow {
    /// `id` column.
    id: String,
    /// `title` column.
    title: String,
    /// `description` column.
    description: Option<String>,
    /// `project_id` column.
    project_id: String,
    /// `assignee` column.
    assignee: Option<String>,
    /// `status` column.
    status: String,
    /// `api_type` column.
    api_type: String,
    /// `priority` column.
    priority: String,
    /// `endpoint` column.
    endpoint: Option<String>,
    /// `method` column.
    method: Option<String>,
    /// `contract_json` column.
    contract_json: Option<String>,
    /// `created_by` column.
    created_by: Option<String>,
    /// `created_at` column (unix ms).
    created_at: i64,
    /// `updated_at` column (unix ms).
    updated_at: i64,
}

impl TaskRow {
    /// Reads the raw columns in [`TASK_COLUMNS`] order.
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            project_id: row.get(3)?,
            assignee: row.get(4)?,
            status: row.get(5)?,
            api_type: row.get(6)?,
            priority: row.get(7)?,
            endpoint: row.get(8)?,
            method: row.get(9)?,
            contract_json: row.get(10)?,
            created_by: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    /// Decodes into a task.
    fn decode(self) -> Result<Task, SqliteStoreError> {
        let contract = self
            .contract_json
            .map(|text| {
                serde_json::from_str::<Value>(&text).map(Contract::new).map_err(|err| {
                    SqliteStoreError::Corrupt(format!("task {} contract_json: {err}", self.id))
                })
            })
            .transpose()?;
        Ok(Task {
            status: decode_enum::<TaskStatus>(&self.status, "tasks.status")?,
            api_type: decode_enum::<ApiType>(&self.api_type, "tasks.api_type")?,
            priority: decode_enum::<Priority>(&self.priority, "tasks.priority")?,
            created_at: decode_timestamp(self.created_at, "tasks.created_at")?,
            updated_at: decode_timestamp(self.updated_at, "tasks.updated_at")?,
            id: TaskId::new(self.id),
            title: self.title,
            description: self.description,
            project_id: ProjectId::new(self.project_id),
            assignee: self.assignee,
            endpoint: self.endpoint,
            method: self.method,
            contract,
            created_by: self.created_by,
        })
    }
}

/// Raw mock response row.
struct MockRow {
    /// `id` column.
    id: String,
    /// `task_id` column.
    task_id: String,
    /// `scenario` column.
    scenario: String,
    /// `status_code` column.
    status_code: i64,
    /// `body_json` column.
    body_json: String,
    /// `created_at` column (unix ms).
    created_at: i64,
    /// `updated_at` column (unix ms).
    updated_at: i64,
}

impl MockRow {
    /// Reads the raw columns in [`MOCK_COLUMNS`] order.
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task_id: row.get(1)?,
            scenario: row.get(2)?,
            status_code: row.get(3)?,
            body_json: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Decodes into a mock response.
    fn decode(self) -> Result<MockResponse, SqliteStoreError> {
        let status_code = u16::try_from(self.status_code).map_err(|_| {
            SqliteStoreError::Corrupt(format!(
                "mock {} status_code out of range: {}",
                self.id, self.status_code
            ))
        })?;
        let body = serde_json::from_str(&self.body_json).map_err(|err| {
            SqliteStoreError::Corrupt(format!("mock {} body_json: {err}", self.id))
        })?;
        Ok(MockResponse {
            id: MockResponseId::new(self.id),
            task_id: TaskId::new(self.task_id),
            scenario: self.scenario,
            status_code,
            body,
            created_at: decode_timestamp(self.created_at, "mock_responses.created_at")?,
            updated_at: decode_timestamp(self.updated_at, "mock_responses.updated_at")?,
        })
    }
}

/// Raw API key row.
struct KeyRow {
    /// `id` column.
    id: String,
    /// `name` column.
    name: String,
    /// `key_prefix` column.
    key_prefix: String,
    /// `key_hash` column.
    key_hash: String,
    /// `permissions_json` column.
    permissions_json: String,
    /// `created_by` column.
    created_by: Option<String>,
    /// `created_at` column (unix ms).
    created_at: i64,
    /// `last_used_at` column (unix ms).
    last_used_at: Option<i64>,
    /// `revoked_at` column (unix ms).
    revoked_at: Option<i64>,
}

impl KeyRow {
    /// Reads the raw columns in [`KEY_COLUMNS`] order.
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            key_prefix: row.get(2)?,
            key_hash: row.get(3)?,
            permissions_json: row.get(4)?,
            created_by: row.get(5)?,
            created_at: row.get(6)?,
            last_used_at: row.get(7)?,
            revoked_at: row.get(8)?,
        })
    }

    /// Decodes into API key metadata.
    fn decode(self) -> Result<ApiKey, SqliteStoreError> {
        let permissions: Vec<ProjectPermission> = serde_json::from_str(&self.permissions_json)
            .map_err(|err| {
                SqliteStoreError::Corrupt(format!("api key {} permissions_json: {err}", self.id))
            })?;
        Ok(ApiKey {
            last_used_at: self
                .last_used_at
                .map(|millis| decode_timestamp(millis, "api_keys.last_used_at"))
                .transpose()?,
            revoked_at: self
                .revoked_at
                .map(|millis| decode_timestamp(millis, "api_keys.revoked_at"))
                .transpose()?,
            created_at: decode_timestamp(self.created_at, "api_keys.created_at")?,
            id: ApiKeyId::new(self.id),
            name: self.name,
            key_prefix: self.key_prefix,
            key_hash: self.key_hash,
            permissions,
            created_by: self.created_by,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a query and collects every mapped row.
fn query_rows<T>(
    connection: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, SqliteStoreError> {
    let mut statement = connection.prepare(sql).map_err(db_error)?;
    let rows = statement.query_map(params, map).map_err(db_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
}

/// Returns true when a single-key lookup finds a row.
fn row_exists(connection: &Connection, sql: &str, key: &str) -> Result<bool, SqliteStoreError> {
    connection
        .query_row(sql, params![key], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(db_error)
}

/// Loads one raw API key row.
fn fetch_key_row(
    connection: &Connection,
    key_id: &ApiKeyId,
) -> Result<Option<KeyRow>, SqliteStoreError> {
    connection
        .query_row(
            &format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE id = ?1"),
            params![key_id.as_str()],
            KeyRow::read,
        )
        .optional()
        .map_err(db_error)
}

/// Encodes an optional contract as JSON text.
fn encode_contract(contract: Option<&Contract>) -> Result<Option<String>, SqliteStoreError> {
    contract
        .map(|contract| {
            serde_json::to_string(contract.as_value())
                .map_err(|err| SqliteStoreError::Invalid(format!("contract: {err}")))
        })
        .transpose()
}

/// Decodes a unix-millisecond column.
fn decode_timestamp(millis: i64, column: &str) -> Result<Timestamp, SqliteStoreError> {
    Timestamp::from_unix_millis(millis)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("{column} out of range: {millis}")))
}

/// Decodes an enum label column.
fn decode_enum<T: FromStr>(label: &str, column: &str) -> Result<T, SqliteStoreError> {
    T::from_str(label)
        .map_err(|_| SqliteStoreError::Corrupt(format!("{column} has unknown label: {label}")))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability and cascades.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS projects (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    graphql_endpoint TEXT,
                    created_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    project_id TEXT NOT NULL
                        REFERENCES projects(id) ON DELETE CASCADE,
                    assignee TEXT,
                    status TEXT NOT NULL,
                    api_type TEXT NOT NULL,
                    priority TEXT NOT NULL,
                    endpoint TEXT,
                    method TEXT,
                    contract_json TEXT,
                    created_by TEXT,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_tasks_project
                    ON tasks (project_id, created_at);
                CREATE TABLE IF NOT EXISTS mock_responses (
                    id TEXT PRIMARY KEY,
                    task_id TEXT NOT NULL
                        REFERENCES tasks(id) ON DELETE CASCADE,
                    scenario TEXT NOT NULL,
                    status_code INTEGER NOT NULL,
                    body_json TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE (task_id, scenario)
                );
                CREATE TABLE IF NOT EXISTS api_keys (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    key_prefix TEXT NOT NULL,
                    key_hash TEXT NOT NULL,
                    permissions_json TEXT NOT NULL,
                    created_by TEXT,
                    created_at INTEGER NOT NULL,
                    last_used_at INTEGER,
                    revoked_at INTEGER
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}
