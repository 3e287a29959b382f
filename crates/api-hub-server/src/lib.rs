// crates/api-hub-server/src/lib.rs
// ============================================================================
// Module: API Hub Server
// Description: HTTP host for the mock resolver, exports, and data API.
// Purpose: Serve API Hub over axum with audit logging and metrics hooks.
// Dependencies: api-hub-core, api-hub-export, api-hub-config, axum, tokio
// ============================================================================

//! ## Overview
//! API Hub server exposes three surfaces on one listener: the mock endpoint
//! under `/mock`, export downloads under `/projects/{id}/export`, and a JSON
//! data API under `/api`. All data access goes through
//! [`api_hub_core::HubService`]; the mock endpoint reads the store directly
//! and never caches.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod error;
pub mod mock;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::HttpAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use error::ApiError;
pub use mock::CORS_ALLOW_HEADERS;
pub use mock::MockTrace;
pub use server::HubServer;
pub use server::ServerError;
pub use server::cache_policy;
pub use server::open_store;
pub use telemetry::LATENCY_BUCKETS_MS;
pub use telemetry::NoopMetrics;
pub use telemetry::RequestMetricEvent;
pub use telemetry::RequestMetrics;
pub use telemetry::RequestOutcome;
pub use telemetry::RouteClass;
