// crates/api-hub-core/src/core/mock.rs
// ============================================================================
// Module: API Hub Mock Responses
// Description: Named mock scenarios attached to tasks.
// Purpose: Define stored (status, body) pairs and their upsert payloads.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A mock response belongs to one task and is unique on `(task_id, scenario)`.
//! It is written only by upsert on that pair and served verbatim by the mock
//! resolver.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::identifiers::MockResponseId;
use crate::core::identifiers::TaskId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Scenario served when a request names none.
pub const DEFAULT_SCENARIO: &str = "success";

/// Lowest accepted HTTP status code; 1xx cannot be a final response.
const MIN_STATUS_CODE: u16 = 200;

/// Highest accepted HTTP status code.
const MAX_STATUS_CODE: u16 = 599;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Validation errors for mock upserts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// Scenario name is empty or whitespace.
    #[error("scenario name must be non-empty")]
    EmptyScenario,
    /// Status code is outside 200..=599.
    #[error("status code {0} is outside 200..=599")]
    InvalidStatus(u16),
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored mock response for a task scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockResponse {
    /// Row identifier.
    pub id: MockResponseId,
    /// Owning task.
    pub task_id: TaskId,
    /// Scenario name.
    pub scenario: String,
    /// HTTP status served.
    pub status_code: u16,
    /// JSON body served verbatim.
    pub body: Value,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last upsert time.
    pub updated_at: Timestamp,
}

/// Upsert payload for `(task_id, scenario)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockUpsert {
    /// Owning task.
    pub task_id: TaskId,
    /// Scenario name.
    pub scenario: String,
    /// HTTP status to serve.
    pub status_code: u16,
    /// JSON body to serve.
    pub body: Value,
}

impl MockUpsert {
    /// Builds an upsert seeded from the scenario's default template.
    #[must_use]
    pub fn from_template(task_id: TaskId, scenario: impl Into<String>) -> Self {
        let scenario = scenario.into();
        let (status_code, body) = scenario_template(&scenario);
        Self { task_id, scenario, status_code, body }
    }

    /// Validates the scenario name and status code.
    ///
    /// # Errors
    ///
    /// Returns [`MockError`] when the payload cannot be stored.
    pub fn validate(&self) -> Result<(), MockError> {
        if self.scenario.trim().is_empty() {
            return Err(MockError::EmptyScenario);
        }
        if !(MIN_STATUS_CODE ..= MAX_STATUS_CODE).contains(&self.status_code) {
            return Err(MockError::InvalidStatus(self.status_code));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Templates
// ============================================================================

/// Returns the default status and body for a new scenario.
#[must_use]
pub fn scenario_template(scenario: &str) -> (u16, Value) {
    match scenario {
        "success" => (200, json!({"data": [], "message": "Success"})),
        "empty" => (200, json!({"data": [], "message": "No data found"})),
        "error" => (500, json!({"error": "Internal Server Error", "code": "INTERNAL_ERROR"})),
        _ => (200, json!({})),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
