// crates/api-hub-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Hub Store Tests
// Description: Integration tests for the SQLite-backed hub store.
// Purpose: Validate persistence, ordering, cascades, and schema versioning.
// ============================================================================

//! ## Overview
//! Exercises [`SqliteHubStore`] against temporary database files:
//! - Round-trip of every record kind across reopen
//! - Task filters and newest-first ordering
//! - Cascade of task deletion to mock responses
//! - Mock upsert identity preservation
//! - API key revocation and conflicts
//! - Schema version mismatch and corrupt row detection

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;

use api_hub_core::Access;
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
use api_hub_store_sqlite::SCHEMA_VERSION;
use api_hub_store_sqlite::SqliteHubStore;
use api_hub_store_sqlite::SqliteStoreConfig;
use api_hub_store_sqlite::SqliteStoreError;
use api_hub_store_sqlite::SqliteStoreMode;
use api_hub_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("nested").join("hub.db")
}

fn open(path: &Path) -> SqliteHubStore {
    SqliteHubStore::new(&SqliteStoreConfig::new(path)).unwrap()
}

fn at(millis: i64) -> Timestamp {
    Timestamp::from_unix_millis(millis).unwrap()
}

fn project(id: &str, name: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        description: Some("desc".to_string()),
        graphql_endpoint: None,
        created_at: at(1_000),
    }
}

fn task(id: &str, project_id: &str, created_at: i64) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("Task {id}"),
        description: None,
        project_id: ProjectId::new(project_id),
        assignee: Some("dana".to_string()),
        status: TaskStatus::Planning,
        api_type: ApiType::Rest,
        priority: Priority::P2,
        endpoint: Some("/users".to_string()),
        method: Some("GET".to_string()),
        contract: Some(Contract::new(json!({"response": {"200": {"body": {"id": "string"}}}}))),
        created_by: None,
        created_at: at(created_at),
        updated_at: at(created_at),
    }
}

fn mock(task_id: &str, scenario: &str, status_code: u16, millis: i64) -> MockResponse {
    MockResponse {
        id: MockResponseId::generate(),
        task_id: TaskId::new(task_id),
        scenario: scenario.to_string(),
        status_code,
        body: json!({"scenario": scenario}),
        created_at: at(millis),
        updated_at: at(millis),
    }
}

fn api_key(id: &str, created_at: i64) -> ApiKey {
    ApiKey {
        id: ApiKeyId::new(id),
        name: format!("key {id}"),
        key_prefix: "ak_abcdefgh".to_string(),
        key_hash: "00".repeat(32),
        permissions: vec![ProjectPermission {
            project_id: ProjectId::new("p1"),
            access: Access::ReadWrite,
        }],
        created_by: None,
        created_at: at(created_at),
        last_used_at: None,
        revoked_at: None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let expected_task = task("t1", "p1", 2_000);
    {
        let store = open(&path);
        store.create_project(&project("p1", "Shop")).unwrap();
        store.insert_task(&expected_task).unwrap();
        store.upsert_mock_response(&mock("t1", "success", 200, 3_000)).unwrap();
        store.insert_api_key(&api_key("k1", 4_000)).unwrap();
    }
    let store = open(&path);
    store.check_connection().unwrap();
    assert_eq!(store.get_project(&ProjectId::new("p1")).unwrap(), Some(project("p1", "Shop")));
    assert_eq!(store.get_task(&TaskId::new("t1")).unwrap(), Some(expected_task));
    let stored_mock = store.get_mock_response(&TaskId::new("t1"), "success").unwrap().unwrap();
    assert_eq!(stored_mock.body, json!({"scenario": "success"}));
    assert_eq!(store.get_api_key(&ApiKeyId::new("k1")).unwrap(), Some(api_key("k1", 4_000)));
}

#[test]
fn duplicate_and_orphan_inserts_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_project(&project("p1", "Shop")).unwrap();
    assert!(matches!(
        store.create_project(&project("p1", "Other")),
        Err(StoreError::Conflict(_))
    ));
    assert!(matches!(store.insert_task(&task("t1", "missing", 1)), Err(StoreError::NotFound(_))));
    store.insert_task(&task("t1", "p1", 1)).unwrap();
    assert!(matches!(store.insert_task(&task("t1", "p1", 1)), Err(StoreError::Conflict(_))));
    assert!(matches!(
        store.update_task(&task("ghost", "p1", 1)),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.upsert_mock_response(&mock("ghost", "success", 200, 1)),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn listings_follow_documented_order() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_project(&project("p2", "Beta")).unwrap();
    store.create_project(&project("p1", "Alpha")).unwrap();
    let names: Vec<String> =
        store.list_projects().unwrap().into_iter().map(|project| project.name).collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    store.insert_task(&task("old", "p1", 1_000)).unwrap();
    store.insert_task(&task("new", "p1", 3_000)).unwrap();
    let mut other = task("mid", "p2", 2_000);
    other.status = TaskStatus::Done;
    other.priority = Priority::P0;
    store.insert_task(&other).unwrap();

    let all: Vec<String> = store
        .list_tasks(&TaskFilter::default())
        .unwrap()
        .into_iter()
        .map(|task| task.id.to_string())
        .collect();
    assert_eq!(all, vec!["new", "mid", "old"]);

    let scoped = store.list_tasks(&TaskFilter::project(ProjectId::new("p1"))).unwrap();
    assert_eq!(scoped.len(), 2);
    let done = TaskFilter { status: Some(TaskStatus::Done), ..TaskFilter::default() };
    assert_eq!(store.list_tasks(&done).unwrap()[0].id, TaskId::new("mid"));
    let urgent = TaskFilter { priority: Some(Priority::P0), ..TaskFilter::default() };
    assert_eq!(store.list_tasks(&urgent).unwrap().len(), 1);

    store.upsert_mock_response(&mock("old", "timeout", 504, 1)).unwrap();
    store.upsert_mock_response(&mock("old", "error", 500, 2)).unwrap();
    store.upsert_mock_response(&mock("old", "success", 200, 3)).unwrap();
    let scenarios: Vec<String> = store
        .list_mock_responses(&TaskId::new("old"))
        .unwrap()
        .into_iter()
        .map(|mock| mock.scenario)
        .collect();
    assert_eq!(scenarios, vec!["error", "success", "timeout"]);

    store.insert_api_key(&api_key("k-old", 1)).unwrap();
    store.insert_api_key(&api_key("k-new", 2)).unwrap();
    let keys: Vec<String> =
        store.list_api_keys().unwrap().into_iter().map(|key| key.id.to_string()).collect();
    assert_eq!(keys, vec!["k-new", "k-old"]);
}

#[test]
fn update_task_replaces_fields_and_clears_contract() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_project(&project("p1", "Shop")).unwrap();
    store.insert_task(&task("t1", "p1", 1)).unwrap();
    let mut updated = task("t1", "p1", 1);
    updated.status = TaskStatus::Mocking;
    updated.contract = None;
    updated.assignee = None;
    updated.updated_at = at(9);
    store.update_task(&updated).unwrap();
    assert_eq!(store.get_task(&TaskId::new("t1")).unwrap(), Some(updated));
}

#[test]
fn mock_upsert_keeps_identity_and_creation_time() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.create_project(&project("p1", "Shop")).unwrap();
    store.insert_task(&task("t1", "p1", 1)).unwrap();
    let first = store.upsert_mock_response(&mock("t1", "success", 200, 10)).unwrap();
    let mut replacement = mock("t1", "success", 201, 20);
    replacement.body = json!([1, 2, 3]);
    let second = store.upsert_mock_response(&replacement).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, at(10));
    assert_eq!(second.updated_at, at(20));
    assert_eq!(second.status_code, 201);
    assert_eq!(store.list_mock_responses(&TaskId::new("t1")).unwrap(), vec![second]);
}

#[test]
fn deleting_a_task_cascades_to_mocks() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let store = open(&path);
    store.create_project(&project("p1", "Shop")).unwrap();
    store.insert_task(&task("t1", "p1", 1)).unwrap();
    store.insert_task(&task("t2", "p1", 2)).unwrap();
    store.upsert_mock_response(&mock("t1", "success", 200, 1)).unwrap();
    store.upsert_mock_response(&mock("t2", "success", 200, 1)).unwrap();

    assert!(store.delete_task(&TaskId::new("t1")).unwrap());
    assert!(!store.delete_task(&TaskId::new("t1")).unwrap());
    assert!(store.get_task(&TaskId::new("t1")).unwrap().is_none());
    assert!(store.list_mock_responses(&TaskId::new("t1")).unwrap().is_empty());
    assert_eq!(store.list_mock_responses(&TaskId::new("t2")).unwrap().len(), 1);

    let connection = Connection::open(&path).unwrap();
    let orphaned: i64 = connection
        .query_row("SELECT COUNT(1) FROM mock_responses WHERE task_id = 't1'", params![], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn revoke_is_one_way() {
    let dir = TempDir::new().unwrap();
    let store = open(&db_path(&dir));
    store.insert_api_key(&api_key("k1", 1)).unwrap();
    let revoked = store.revoke_api_key(&ApiKeyId::new("k1"), at(50)).unwrap();
    assert_eq!(revoked.revoked_at, Some(at(50)));
    assert!(matches!(
        store.revoke_api_key(&ApiKeyId::new("k1"), at(60)),
        Err(StoreError::Conflict(_))
    ));
    assert!(matches!(
        store.revoke_api_key(&ApiKeyId::new("missing"), at(60)),
        Err(StoreError::NotFound(_))
    ));
    let stored = store.get_api_key(&ApiKeyId::new("k1")).unwrap().unwrap();
    assert_eq!(stored.revoked_at, Some(at(50)));
    assert_eq!(stored.access_for(&ProjectId::new("p1")), Access::ReadWrite);
}

#[test]
fn key_use_is_recorded_and_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    {
        let store = open(&path);
        store.insert_api_key(&api_key("k1", 1)).unwrap();
        let used = store.record_api_key_use(&ApiKeyId::new("k1"), at(70)).unwrap();
        assert_eq!(used.last_used_at, Some(at(70)));
        assert!(matches!(
            store.record_api_key_use(&ApiKeyId::new("missing"), at(70)),
            Err(StoreError::NotFound(_))
        ));
    }
    let stored = open(&path).get_api_key(&ApiKeyId::new("k1")).unwrap().unwrap();
    assert_eq!(stored.last_used_at, Some(at(70)));
    assert_eq!(stored.revoked_at, None);
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    drop(open(&path));
    let connection = Connection::open(&path).unwrap();
    connection
        .execute("UPDATE store_meta SET version = ?1", params![SCHEMA_VERSION + 1])
        .unwrap();
    drop(connection);
    let result = SqliteHubStore::new(&SqliteStoreConfig::new(&path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn corrupt_rows_fail_closed() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let store = open(&path);
    store.create_project(&project("p1", "Shop")).unwrap();
    store.insert_task(&task("t1", "p1", 1)).unwrap();
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE tasks SET status = 'archived' WHERE id = 't1'", params![]).unwrap();
    drop(connection);
    assert!(matches!(store.get_task(&TaskId::new("t1")), Err(StoreError::Corrupt(_))));
}

#[test]
fn directory_paths_are_rejected() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        path: dir.path().to_path_buf(),
        busy_timeout_ms: 100,
        journal_mode: SqliteStoreMode::Delete,
        sync_mode: SqliteSyncMode::Normal,
    };
    assert!(matches!(SqliteHubStore::new(&config), Err(SqliteStoreError::Invalid(_))));
}
