// crates/api-hub-server/src/api.rs
// ============================================================================
// Module: Data API Handlers
// Description: JSON routes for projects, tasks, contracts, mocks, and keys.
// Purpose: Expose the data access service and export downloads over HTTP.
// Dependencies: api-hub-core, api-hub-export, axum, serde, tokio
// ============================================================================

//! ## Overview
//! Handlers parse untrusted bodies themselves so that malformed JSON and
//! oversized payloads surface as [`ApiError`] JSON rather than framework
//! plain-text rejections. Every service call runs on the blocking pool since
//! the backing stores are synchronous.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use api_hub_core::ApiKey;
use api_hub_core::ApiKeyId;
use api_hub_core::ApiKeyRequest;
use api_hub_core::Contract;
use api_hub_core::HubService;
use api_hub_core::IssuedApiKey;
use api_hub_core::KeyAuthorization;
use api_hub_core::MockResponse;
use api_hub_core::MockUpsert;
use api_hub_core::NewProject;
use api_hub_core::NewTask;
use api_hub_core::Project;
use api_hub_core::ProjectId;
use api_hub_core::ServiceError;
use api_hub_core::Task;
use api_hub_core::TaskFilter;
use api_hub_core::TaskId;
use api_hub_core::TaskPatch;
use api_hub_core::TaskStatus;
use api_hub_core::Timestamp;
use api_hub_core::parse_opaque_json;
use api_hub_core::scenario_template;
use api_hub_export::ExportFormat;
use api_hub_export::export_file_name;
use api_hub_export::render_export;
use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::server::ServerState;

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Body of `PUT /api/tasks/{task_id}/status`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatusChange {
    /// Target column.
    status: TaskStatus,
}

/// Body of `PUT /api/tasks/{task_id}/mocks/{scenario}`.
///
/// Omitted fields fall back to the scenario template.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MockBody {
    /// Status to serve.
    #[serde(default)]
    status_code: Option<u16>,
    /// Body to serve.
    #[serde(default)]
    body: Option<Value>,
}

/// Body of `POST /api/keys/check`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeyCheck {
    /// Presented secret.
    secret: String,
    /// Project the caller wants to reach.
    project_id: ProjectId,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a service call on the blocking pool.
async fn run_service<T, F>(state: &ServerState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&HubService) -> Result<T, ServiceError> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|_| ApiError::Internal("request task failed".to_string()))?
        .map_err(ApiError::from)
}

/// Checks the body against the configured limit and returns its bytes.
fn read_body(state: &ServerState, body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(state.max_body_bytes)
        } else {
            ApiError::Invalid(rejection.body_text())
        }
    })?;
    if bytes.len() > state.max_body_bytes {
        return Err(ApiError::PayloadTooLarge(state.max_body_bytes));
    }
    Ok(bytes)
}

/// Parses a JSON request body.
fn parse_json<T: DeserializeOwned>(
    state: &ServerState,
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ApiError> {
    decode_json(&read_body(state, body)?)
}

/// Decodes JSON bytes, reporting the parser message.
fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|err| ApiError::Invalid(format!("malformed json: {err}")))
}

// ============================================================================
// SECTION: Health
// ============================================================================

/// Liveness probe.
pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================================
// SECTION: Projects
// ============================================================================

/// `GET /api/projects`.
pub(crate) async fn list_projects(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<Project>>, ApiError> {
    run_service(&state, HubService::list_projects).await.map(Json)
}

/// `POST /api/projects`.
pub(crate) async fn create_project(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let input: NewProject = parse_json(&state, body)?;
    let project = run_service(&state, move |service| service.create_project(input)).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

// ============================================================================
// SECTION: Tasks
// ============================================================================

/// `GET /api/tasks?project_id&status&priority`.
pub(crate) async fn list_tasks(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Query(filter) = query.map_err(|rejection| ApiError::Invalid(rejection.body_text()))?;
    run_service(&state, move |service| service.list_tasks(&filter)).await.map(Json)
}

/// `POST /api/tasks`.
pub(crate) async fn create_task(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let input: NewTask = parse_json(&state, body)?;
    let task = run_service(&state, move |service| service.create_task(input)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /api/tasks/{task_id}`.
pub(crate) async fn get_task(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task_id = TaskId::new(task_id);
    run_service(&state, move |service| service.get_task(&task_id)).await.map(Json)
}

/// `PATCH /api/tasks/{task_id}`.
pub(crate) async fn update_task(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Task>, ApiError> {
    let patch: TaskPatch = parse_json(&state, body)?;
    let task_id = TaskId::new(task_id);
    run_service(&state, move |service| service.update_task(&task_id, patch)).await.map(Json)
}

/// `DELETE /api/tasks/{task_id}`; mocks go with the task.
pub(crate) async fn delete_task(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task_id = TaskId::new(task_id);
    run_service(&state, move |service| service.delete_task(&task_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/tasks/{task_id}/status`.
pub(crate) async fn set_task_status(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Task>, ApiError> {
    let change: StatusChange = parse_json(&state, body)?;
    let task_id = TaskId::new(task_id);
    run_service(&state, move |service| service.set_task_status(&task_id, change.status))
        .await
        .map(Json)
}

/// `PUT /api/tasks/{task_id}/contract` with raw contract text.
///
/// Text that does not parse is rejected with the parser message and nothing
/// is stored. A body of `null` clears the contract.
pub(crate) async fn set_task_contract(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Task>, ApiError> {
    let bytes = read_body(&state, body)?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| ApiError::Invalid("contract must be utf-8 text".to_string()))?;
    let value = parse_opaque_json(text).map_err(|err| ApiError::Invalid(err.to_string()))?;
    let contract = match value {
        Value::Null => None,
        value => Some(Contract::new(value)),
    };
    let task_id = TaskId::new(task_id);
    run_service(&state, move |service| service.set_contract(&task_id, contract)).await.map(Json)
}

// ============================================================================
// SECTION: Mock Responses
// ============================================================================

/// `GET /api/tasks/{task_id}/mocks`, ordered by scenario.
pub(crate) async fn list_mocks(
    State(state): State<Arc<ServerState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<MockResponse>>, ApiError> {
    let task_id = TaskId::new(task_id);
    run_service(&state, move |service| service.list_mocks(&task_id)).await.map(Json)
}

/// `PUT /api/tasks/{task_id}/mocks/{scenario}`.
pub(crate) async fn upsert_mock(
    State(state): State<Arc<ServerState>>,
    Path((task_id, scenario)): Path<(String, String)>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MockResponse>, ApiError> {
    let bytes = read_body(&state, body)?;
    let input: MockBody = if bytes.is_empty() { MockBody::default() } else { decode_json(&bytes)? };
    let (template_status, template_body) = scenario_template(&scenario);
    let upsert = MockUpsert {
        task_id: TaskId::new(task_id),
        status_code: input.status_code.unwrap_or(template_status),
        body: input.body.unwrap_or(template_body),
        scenario,
    };
    run_service(&state, move |service| service.upsert_mock(upsert)).await.map(Json)
}

// ============================================================================
// SECTION: API Keys
// ============================================================================

/// `GET /api/keys`, newest first.
pub(crate) async fn list_keys(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<ApiKey>>, ApiError> {
    run_service(&state, HubService::list_api_keys).await.map(Json)
}

/// `POST /api/keys`; the response is the only place the secret appears.
pub(crate) async fn create_key(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<IssuedApiKey>), ApiError> {
    let request: ApiKeyRequest = parse_json(&state, body)?;
    let issued = run_service(&state, move |service| service.create_api_key(request)).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// `POST /api/keys/{key_id}/revoke`.
pub(crate) async fn revoke_key(
    State(state): State<Arc<ServerState>>,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKey>, ApiError> {
    let key_id = ApiKeyId::new(key_id);
    run_service(&state, move |service| service.revoke_api_key(&key_id)).await.map(Json)
}

/// `POST /api/keys/check`; 401 unless a live key matches the secret.
pub(crate) async fn check_key(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<KeyAuthorization>, ApiError> {
    let check: KeyCheck = parse_json(&state, body)?;
    run_service(&state, move |service| {
        service.authorize_api_key(&check.secret, &check.project_id)
    })
    .await
    .map(Json)
}

// ============================================================================
// SECTION: Exports
// ============================================================================

/// `GET /projects/{project_id}/export/openapi.json`.
pub(crate) async fn export_openapi_json(
    State(state): State<Arc<ServerState>>,
    Path(project_id): Path<String>,
) -> Result<Response, ApiError> {
    export(&state, project_id, ExportFormat::OpenApiJson).await
}

/// `GET /projects/{project_id}/export/openapi.yaml`.
pub(crate) async fn export_openapi_yaml(
    State(state): State<Arc<ServerState>>,
    Path(project_id): Path<String>,
) -> Result<Response, ApiError> {
    export(&state, project_id, ExportFormat::OpenApiYaml).await
}

/// `GET /projects/{project_id}/export/docs.md`.
pub(crate) async fn export_markdown(
    State(state): State<Arc<ServerState>>,
    Path(project_id): Path<String>,
) -> Result<Response, ApiError> {
    export(&state, project_id, ExportFormat::Markdown).await
}

/// Renders one export artifact as a download.
async fn export(
    state: &ServerState,
    project_id: String,
    format: ExportFormat,
) -> Result<Response, ApiError> {
    let project_id = ProjectId::new(project_id);
    let (project, tasks) = run_service(state, move |service| {
        let project = service.get_project(&project_id)?;
        let tasks = service.list_tasks(&TaskFilter::project(project_id))?;
        Ok((project, tasks))
    })
    .await?;
    let generated_on = Timestamp::now();
    let text = render_export(format, &project, &tasks, &generated_on)?;
    let file_name = export_file_name(&project, format, &generated_on);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .map_err(|_| ApiError::Internal("export file name invalid".to_string()))?;
    let mut response = (StatusCode::OK, text).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(format.content_type()));
    headers.insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}
