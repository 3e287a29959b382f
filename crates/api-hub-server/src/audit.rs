// crates/api-hub-server/src/audit.rs
// ============================================================================
// Module: Server Audit Logging
// Description: Structured audit events for HTTP request handling.
// Purpose: Emit JSON-line request logs without hard dependencies.
// Dependencies: api-hub-config, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the `http_request` audit event and the sinks that
//! write it as one JSON object per line. Events never carry request or
//! response bodies; mock requests record only the task and scenario served.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use api_hub_config::ServerAuditConfig;
use serde::Serialize;

use crate::telemetry::RequestOutcome;
use crate::telemetry::RouteClass;

// ============================================================================
// SECTION: Types
// ============================================================================

/// HTTP request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct HttpAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Route class.
    pub route: RouteClass,
    /// HTTP method.
    pub method: String,
    /// HTTP status returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Mocked task when the mock endpoint resolved an identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_task_id: Option<String>,
    /// Scenario requested or served by the mock endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_scenario: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Handling time in milliseconds.
    pub latency_ms: u128,
}

/// Inputs required to construct an audit event.
pub struct HttpAuditEventParams {
    /// Route class.
    pub route: RouteClass,
    /// HTTP method.
    pub method: String,
    /// HTTP status returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Mocked task, if any.
    pub mock_task_id: Option<String>,
    /// Mock scenario, if any.
    pub mock_scenario: Option<String>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Handling time in milliseconds.
    pub latency_ms: u128,
}

impl HttpAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: HttpAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "http_request",
            timestamp_ms,
            route: params.route,
            method: params.method,
            status: params.status,
            outcome: params.outcome,
            mock_task_id: params.mock_task_id,
            mock_scenario: params.mock_scenario,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            latency_ms: params.latency_ms,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for HTTP request events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &HttpAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &HttpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &HttpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &HttpAuditEvent) {}
}

/// Builds the sink selected by `[server.audit]`.
///
/// # Errors
///
/// Returns an error when the audit file cannot be opened.
pub fn build_audit_sink(config: &ServerAuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match config.path.as_deref() {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
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

    use std::fs;

    use api_hub_config::ServerAuditConfig;
    use serde_json::Value;
    use tempfile::TempDir;

    use super::HttpAuditEvent;
    use super::HttpAuditEventParams;
    use super::build_audit_sink;
    use crate::telemetry::RequestOutcome;
    use crate::telemetry::RouteClass;

    fn mock_event() -> HttpAuditEvent {
        HttpAuditEvent::new(HttpAuditEventParams {
            route: RouteClass::Mock,
            method: "GET".to_string(),
            status: 404,
            outcome: RequestOutcome::Error,
            mock_task_id: Some("t1".to_string()),
            mock_scenario: Some("missing".to_string()),
            request_bytes: 0,
            response_bytes: 96,
            latency_ms: 3,
        })
    }

    #[test]
    fn file_sink_appends_one_json_object_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let config = ServerAuditConfig {
            enabled: true,
            path: Some(path.display().to_string()),
        };
        let sink = build_audit_sink(&config).unwrap();
        sink.record(&mock_event());
        sink.record(&mock_event());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "http_request");
        assert_eq!(first["route"], "mock");
        assert_eq!(first["outcome"], "error");
        assert_eq!(first["mock_scenario"], "missing");
    }

    #[test]
    fn disabled_audit_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let config = ServerAuditConfig {
            enabled: false,
            path: Some(path.display().to_string()),
        };
        build_audit_sink(&config).unwrap().record(&mock_event());
        assert!(!path.exists());
    }

    #[test]
    fn non_mock_events_omit_mock_fields() {
        let mut event = mock_event();
        event.mock_task_id = None;
        event.mock_scenario = None;
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("mock_task_id").is_none());
        assert!(value.get("mock_scenario").is_none());
    }
}
