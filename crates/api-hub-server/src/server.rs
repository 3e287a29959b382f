// crates/api-hub-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: Router assembly, store selection, and the serve loop.
// Purpose: Host the mock resolver, exports, and data API on one listener.
// Dependencies: api-hub-config, api-hub-core, api-hub-store-sqlite, axum, tokio
// ============================================================================

//! ## Overview
//! [`HubServer`] validates configuration, opens the configured store, and
//! serves every route from one axum router. A request observer wraps all
//! routes and emits one audit event and one metric event per request.
//! Security posture: request bodies are untrusted and size-limited; binding
//! beyond loopback requires an explicit opt-in and logs a warning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use api_hub_config::ApiHubConfig;
use api_hub_config::StoreConfig;
use api_hub_config::StoreType;
use api_hub_core::CachePolicy;
use api_hub_core::HubService;
use api_hub_core::InMemoryHubStore;
use api_hub_core::SharedHubStore;
use api_hub_store_sqlite::SqliteHubStore;
use axum::Router;
use axum::body::HttpBody;
use axum::extract::DefaultBodyLimit;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::any;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use tokio::net::TcpListener;

use crate::api;
use crate::audit::AuditSink;
use crate::audit::HttpAuditEvent;
use crate::audit::HttpAuditEventParams;
use crate::audit::build_audit_sink;
use crate::error::ApiError;
use crate::mock;
use crate::mock::MockTrace;
use crate::telemetry::NoopMetrics;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestMetrics;
use crate::telemetry::RequestOutcome;
use crate::telemetry::RouteClass;

// ============================================================================
// SECTION: Server
// ============================================================================

/// API Hub HTTP server instance.
pub struct HubServer {
    /// Validated configuration.
    config: ApiHubConfig,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl HubServer {
    /// Builds a server from configuration, opening the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration or initialization fails.
    pub fn from_config(config: ApiHubConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = open_store(&config.store)?;
        Self::with_store(config, store)
    }

    /// Builds a server over an already opened store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration or the audit sink fails.
    pub fn with_store(config: ApiHubConfig, store: SharedHubStore) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config.server.audit)
            .map_err(|err| ServerError::Init(format!("audit sink: {err}")))?;
        let service = HubService::with_cache_policy(store, cache_policy(&config.store));
        let state = Arc::new(ServerState::new(
            service,
            &config,
            audit,
            Arc::new(NoopMetrics),
        ));
        Ok(Self {
            config,
            state,
        })
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(self, metrics: Arc<dyn RequestMetrics>) -> Self {
        let state = Arc::new(ServerState {
            metrics,
            ..ServerState::clone(&self.state)
        });
        Self {
            config: self.config,
            state,
        }
    }

    /// Returns the router serving every route.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        self.serve_listener(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            emit_non_loopback_warning(addr);
        }
        axum::serve(listener, self.router())
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

/// Opens the hub store selected by `[store]`.
///
/// # Errors
///
/// Returns [`ServerError`] when the store cannot be opened.
pub fn open_store(config: &StoreConfig) -> Result<SharedHubStore, ServerError> {
    match config.store_type {
        StoreType::Memory => Ok(SharedHubStore::from_store(InMemoryHubStore::new())),
        StoreType::Sqlite => {
            let sqlite_config = config
                .sqlite_config()
                .ok_or_else(|| ServerError::Config("sqlite store requires path".to_string()))?;
            let store = SqliteHubStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(SharedHubStore::from_store(store))
        }
    }
}

/// Read cache policy for the server's long-lived service.
///
/// A SQLite file is also written by CLI processes whose writes never reach
/// this cache, so reads against it always go to the store.
#[must_use]
pub fn cache_policy(config: &StoreConfig) -> CachePolicy {
    match config.store_type {
        StoreType::Memory => CachePolicy::default(),
        StoreType::Sqlite => CachePolicy::disabled(),
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state for every handler.
#[derive(Clone)]
pub(crate) struct ServerState {
    /// Cached data access.
    pub(crate) service: Arc<HubService>,
    /// Scenario served when a mock request names none.
    pub(crate) default_scenario: String,
    /// Maximum accepted request body size.
    pub(crate) max_body_bytes: usize,
    /// Request audit sink.
    pub(crate) audit: Arc<dyn AuditSink>,
    /// Request metrics sink.
    pub(crate) metrics: Arc<dyn RequestMetrics>,
}

impl ServerState {
    /// Builds handler state from validated configuration.
    pub(crate) fn new(
        service: HubService,
        config: &ApiHubConfig,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<dyn RequestMetrics>,
    ) -> Self {
        Self {
            service: Arc::new(service),
            default_scenario: config.server.default_scenario.clone(),
            max_body_bytes: config.server.max_body_bytes,
            audit,
            metrics,
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Assembles every route over shared state.
pub(crate) fn build_router(state: Arc<ServerState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/mock", any(mock::handle_mock_root))
        .route("/mock/", any(mock::handle_mock_root))
        .route("/mock/{*rest}", any(mock::handle_mock_task))
        .route("/projects/{project_id}/export/openapi.json", get(api::export_openapi_json))
        .route("/projects/{project_id}/export/openapi.yaml", get(api::export_openapi_yaml))
        .route("/projects/{project_id}/export/docs.md", get(api::export_markdown))
        .route("/api/projects", get(api::list_projects).post(api::create_project))
        .route("/api/tasks", get(api::list_tasks).post(api::create_task))
        .route(
            "/api/tasks/{task_id}",
            get(api::get_task).patch(api::update_task).delete(api::delete_task),
        )
        .route("/api/tasks/{task_id}/status", put(api::set_task_status))
        .route("/api/tasks/{task_id}/contract", put(api::set_task_contract))
        .route("/api/tasks/{task_id}/mocks", get(api::list_mocks))
        .route("/api/tasks/{task_id}/mocks/{scenario}", put(api::upsert_mock))
        .route("/api/keys", get(api::list_keys).post(api::create_key))
        .route("/api/keys/check", post(api::check_key))
        .route("/api/keys/{key_id}/revoke", post(api::revoke_key))
        .route("/healthz", get(api::handle_health))
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(from_fn_with_state(Arc::clone(&state), observe_request))
        .with_state(state)
}

/// Fallback for unknown routes.
async fn handle_not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

// ============================================================================
// SECTION: Observability
// ============================================================================

/// Records one audit event and one metric event per request.
async fn observe_request(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let route = RouteClass::from_path(request.uri().path());
    let method = request.method().as_str().to_string();
    let request_bytes = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);

    let response = next.run(request).await.into_response();

    let latency = started.elapsed();
    let status = response.status();
    let trace = response.extensions().get::<MockTrace>().cloned();
    let served_mock = trace.as_ref().is_some_and(|trace| trace.served);
    let outcome = if served_mock || !(status.is_client_error() || status.is_server_error()) {
        RequestOutcome::Ok
    } else {
        RequestOutcome::Error
    };
    let response_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let (mock_task_id, mock_scenario) =
        trace.map_or((None, None), |trace| (trace.task_id, trace.scenario));

    let metric = RequestMetricEvent {
        route,
        method: method.clone(),
        status: status.as_u16(),
        outcome,
        request_bytes,
        response_bytes,
    };
    state.metrics.record_request(metric.clone());
    state.metrics.record_latency(metric, latency);
    state.audit.record(&HttpAuditEvent::new(HttpAuditEventParams {
        route,
        method,
        status: status.as_u16(),
        outcome,
        mock_task_id,
        mock_scenario,
        request_bytes,
        response_bytes,
        latency_ms: latency.as_millis(),
    }));
    response
}

/// Warns on stderr when the listener is reachable beyond loopback.
fn emit_non_loopback_warning(addr: SocketAddr) {
    if !addr.ip().is_loopback() {
        let _ = writeln!(
            std::io::stderr(),
            "api-hub: WARNING: listening on non-loopback address {addr}; the data API has no \
             authentication"
        );
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
