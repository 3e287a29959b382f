// crates/api-hub-server/src/telemetry.rs
// ============================================================================
// Module: Server Telemetry
// Description: Observability hooks for HTTP request handling.
// Purpose: Provide metric events and latency buckets without hard deps.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for request counters and
//! latency histograms. Deployments can plug in Prometheus or OpenTelemetry
//! behind [`RequestMetrics`]. Labels are derived from route classes, never
//! from raw paths, so task identifiers do not leak into metric cardinality.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for request histograms.
pub const LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Route classification used for labels.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Mock resolver endpoint.
    Mock,
    /// Export downloads.
    Export,
    /// Data API under `/api`.
    Api,
    /// Liveness probe.
    Health,
    /// Anything else.
    Other,
}

impl RouteClass {
    /// Classifies a request path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path == "/mock" || path.starts_with("/mock/") {
            Self::Mock
        } else if path == "/api" || path.starts_with("/api/") {
            Self::Api
        } else if path == "/healthz" {
            Self::Health
        } else if path.starts_with("/projects/") && path.contains("/export/") {
            Self::Export
        } else {
            Self::Other
        }
    }

    /// Returns a stable label for the route class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Export => "export",
            Self::Api => "api",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Request served as intended.
    Ok,
    /// Request failed.
    Error,
}

impl RequestOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Request metric event payload.
#[derive(Debug, Clone)]
pub struct RequestMetricEvent {
    /// Route class.
    pub route: RouteClass,
    /// HTTP method.
    pub method: String,
    /// HTTP status returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Request body size in bytes when declared.
    pub request_bytes: usize,
    /// Response body size in bytes when known.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for requests and latencies.
pub trait RequestMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: RequestMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: RequestMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl RequestMetrics for NoopMetrics {
    fn record_request(&self, _event: RequestMetricEvent) {}

    fn record_latency(&self, _event: RequestMetricEvent, _latency: Duration) {}
}

/// Returns the index of the first bucket that holds `latency`.
///
/// Observations above the last bound land in the overflow slot
/// `LATENCY_BUCKETS_MS.len()`.
#[must_use]
pub fn latency_bucket(latency: Duration) -> usize {
    let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    LATENCY_BUCKETS_MS.iter().position(|bound| millis <= *bound).unwrap_or(LATENCY_BUCKETS_MS.len())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
