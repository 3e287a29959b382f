// crates/api-hub-server/src/mock.rs
// ============================================================================
// Module: Mock Endpoint
// Description: HTTP surface of the mock response resolver.
// Purpose: Serve stored scenario bodies with CORS and mock marker headers.
// Dependencies: api-hub-core, axum, serde, tokio
// ============================================================================

//! ## Overview
//! `/mock/{task_id}` serves the stored body for the scenario named by the
//! `x-mock-scenario` header, or the configured default. The task id is the
//! last path segment, so `/mock/a/t1` serves `t1` and `/mock/t1/` has none. Every response carries
//! permissive CORS headers; `OPTIONS` is acknowledged with a bare `ok`. The
//! three resolver failures map to 400, 404, and 500 with fixed JSON bodies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use api_hub_core::MockResolution;
use api_hub_core::ResolveError;
use api_hub_core::resolve_mock_with_default;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::PathRejection;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::server::ServerState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Request header naming the scenario to serve.
pub const SCENARIO_HEADER: &str = "x-mock-scenario";

/// Response header marking a served mock.
pub const MOCK_RESPONSE_HEADER: &str = "x-mock-response";

/// Response header echoing the served scenario.
pub const MOCK_SCENARIO_HEADER: &str = "x-mock-scenario";

/// Value of `Access-Control-Allow-Origin`.
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// Value of `Access-Control-Allow-Headers`.
pub const CORS_ALLOW_HEADERS: &str =
    "authorization, x-client-info, apikey, content-type, x-mock-scenario";

/// Usage hint returned when no task identifier is supplied.
const USAGE: &str = "/mock/{task_id}";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Mock request details attached to responses for audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTrace {
    /// Task identifier, when one was supplied.
    pub task_id: Option<String>,
    /// Scenario requested or served.
    pub scenario: Option<String>,
    /// Whether a stored mock was served.
    pub served: bool,
}

/// Body for a request without a task identifier.
#[derive(Serialize)]
struct MissingTaskBody {
    /// Error label.
    error: &'static str,
    /// Route template hint.
    usage: &'static str,
}

/// Body for an unmatched scenario.
#[derive(Serialize)]
struct ScenarioNotFoundBody {
    /// Error label.
    error: &'static str,
    /// Requested task.
    task_id: String,
    /// Requested scenario.
    requested_scenario: String,
    /// Scenarios stored for the task.
    available_scenarios: Vec<String>,
}

/// Body for an internal failure.
#[derive(Serialize)]
struct InternalBody {
    /// Error label.
    error: &'static str,
    /// Short failure label.
    message: String,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `/mock` and `/mock/` where no identifier is present.
pub(crate) async fn handle_mock_root(
    State(state): State<Arc<ServerState>>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    mock_response(&state, &method, None, &headers).await
}

/// Handles every path below `/mock/`.
pub(crate) async fn handle_mock_task(
    State(state): State<Arc<ServerState>>,
    method: Method,
    headers: HeaderMap,
    rest: Result<Path<String>, PathRejection>,
) -> Response {
    let task_id = rest.ok().map(|Path(rest)| last_segment(&rest).to_string());
    mock_response(&state, &method, task_id, &headers).await
}

/// Returns the final `/`-separated segment; empty after a trailing slash.
pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Resolves one mock request into a complete response.
pub(crate) async fn mock_response(
    state: &ServerState,
    method: &Method,
    task_id: Option<String>,
    headers: &HeaderMap,
) -> Response {
    if method == Method::OPTIONS {
        return with_cors((StatusCode::OK, "ok").into_response());
    }
    let scenario = headers
        .get(SCENARIO_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let store = state.service.store().clone();
    let default_scenario = state.default_scenario.clone();
    let lookup_task = task_id.clone();
    let lookup_scenario = scenario.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        resolve_mock_with_default(
            &store,
            lookup_task.as_deref(),
            lookup_scenario.as_deref(),
            &default_scenario,
        )
    })
    .await
    .unwrap_or_else(|_| Err(ResolveError::Internal("mock lookup failed".to_string())));

    let (response, trace) = match outcome {
        Ok(resolution) => {
            let trace = MockTrace {
                task_id: Some(resolution.task_id.to_string()),
                scenario: Some(resolution.scenario.clone()),
                served: true,
            };
            (served_response(resolution), trace)
        }
        Err(err) => {
            let requested = scenario
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| state.default_scenario.clone());
            let trace = MockTrace {
                task_id: match &err {
                    ResolveError::MissingTaskId => None,
                    ResolveError::ScenarioNotFound { .. } | ResolveError::Internal(_) => task_id,
                },
                scenario: Some(requested),
                served: false,
            };
            (error_response(err), trace)
        }
    };
    let mut response = with_cors(response);
    response.extensions_mut().insert(trace);
    response
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Builds the response for a resolved mock.
fn served_response(resolution: MockResolution) -> Response {
    let Ok(status) = StatusCode::from_u16(resolution.status_code) else {
        return error_response(ResolveError::Internal("stored status code invalid".to_string()));
    };
    let Ok(body) = serde_json::to_vec(&resolution.body) else {
        return error_response(ResolveError::Internal("stored body invalid".to_string()));
    };
    let mut response = json_response(status, body);
    let headers = response.headers_mut();
    headers.insert(HeaderName::from_static(MOCK_RESPONSE_HEADER), HeaderValue::from_static("true"));
    if let Ok(value) = HeaderValue::from_str(&resolution.scenario) {
        headers.insert(HeaderName::from_static(MOCK_SCENARIO_HEADER), value);
    }
    response
}

/// Builds the response for a resolver failure.
fn error_response(err: ResolveError) -> Response {
    let (status, body) = match err {
        ResolveError::MissingTaskId => (
            StatusCode::BAD_REQUEST,
            serde_json::to_vec(&MissingTaskBody {
                error: "Task ID required",
                usage: USAGE,
            }),
        ),
        ResolveError::ScenarioNotFound {
            task_id,
            requested_scenario,
            available_scenarios,
        } => (
            StatusCode::NOT_FOUND,
            serde_json::to_vec(&ScenarioNotFoundBody {
                error: "Mock response not found",
                task_id,
                requested_scenario,
                available_scenarios,
            }),
        ),
        ResolveError::Internal(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::to_vec(&InternalBody {
                error: "Internal error",
                message,
            }),
        ),
    };
    let body = body.unwrap_or_else(|_| br#"{"error":"Internal error"}"#.to_vec());
    json_response(status, body)
}

/// Wraps a JSON payload with its content type.
fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response()
}

/// Adds the CORS headers carried by every mock response.
fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(CORS_ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(CORS_ALLOW_HEADERS));
    response
}
