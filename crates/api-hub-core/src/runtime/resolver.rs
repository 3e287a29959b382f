// crates/api-hub-core/src/runtime/resolver.rs
// ============================================================================
// Module: API Hub Mock Resolver
// Description: Resolves (task, scenario) pairs to stored mock responses.
// Purpose: Serve mock bodies verbatim or explain which scenarios exist.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The resolver is stateless: every call performs one fresh store lookup with
//! no cache and no retry. A missing task identifier is a caller error, an
//! unknown scenario reports every scenario stored for the task, and store
//! failures collapse to a short label with no internal detail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::DEFAULT_SCENARIO;
use crate::core::TaskId;
use crate::interfaces::HubStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path placeholders treated as a missing task identifier.
const PLACEHOLDER_IDS: [&str; 2] = ["mock", "{task_id}"];

/// Label reported when the store lookup fails.
const LOOKUP_FAILED: &str = "mock lookup failed";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Successful mock resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResolution {
    /// Requested task.
    pub task_id: TaskId,
    /// Scenario served.
    pub scenario: String,
    /// Stored status code.
    pub status_code: u16,
    /// Stored body, verbatim.
    pub body: Value,
}

/// Resolver failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No usable task identifier was supplied.
    #[error("task id required")]
    MissingTaskId,
    /// No mock is stored for the requested scenario.
    #[error("mock response not found for task {task_id} scenario {requested_scenario}")]
    ScenarioNotFound {
        /// Requested task.
        task_id: String,
        /// Requested scenario.
        requested_scenario: String,
        /// Scenarios stored for the task, ordered by name.
        available_scenarios: Vec<String>,
    },
    /// Store lookup failed; carries a short label only.
    #[error("internal error: {0}")]
    Internal(String),
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a mock using the `success` scenario as default.
///
/// # Errors
///
/// Returns [`ResolveError`] as described on [`resolve_mock_with_default`].
pub fn resolve_mock<S: HubStore + ?Sized>(
    store: &S,
    task_id: Option<&str>,
    scenario: Option<&str>,
) -> Result<MockResolution, ResolveError> {
    resolve_mock_with_default(store, task_id, scenario, DEFAULT_SCENARIO)
}

/// Resolves a mock, falling back to `default_scenario` when none is named.
///
/// # Errors
///
/// - [`ResolveError::MissingTaskId`] when the id is absent, empty, `mock`, or `{task_id}`.
/// - [`ResolveError::ScenarioNotFound`] when no mock matches.
/// - [`ResolveError::Internal`] when the store fails.
pub fn resolve_mock_with_default<S: HubStore + ?Sized>(
    store: &S,
    task_id: Option<&str>,
    scenario: Option<&str>,
    default_scenario: &str,
) -> Result<MockResolution, ResolveError> {
    let task_id = task_id
        .filter(|id| !id.is_empty() && !PLACEHOLDER_IDS.contains(id))
        .ok_or(ResolveError::MissingTaskId)?;
    let scenario = scenario.filter(|name| !name.is_empty()).unwrap_or(default_scenario);
    let task = TaskId::new(task_id);

    let found = store
        .get_mock_response(&task, scenario)
        .map_err(|_| ResolveError::Internal(LOOKUP_FAILED.to_string()))?;
    if let Some(mock) = found {
        return Ok(MockResolution {
            task_id: task,
            scenario: scenario.to_string(),
            status_code: mock.status_code,
            body: mock.body,
        });
    }

    let available_scenarios = store
        .list_mock_responses(&task)
        .map_err(|_| ResolveError::Internal(LOOKUP_FAILED.to_string()))?
        .into_iter()
        .map(|mock| mock.scenario)
        .collect();
    Err(ResolveError::ScenarioNotFound {
        task_id: task_id.to_string(),
        requested_scenario: scenario.to_string(),
        available_scenarios,
    })
}
