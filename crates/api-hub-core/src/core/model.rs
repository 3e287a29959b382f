// crates/api-hub-core/src/core/model.rs
// ============================================================================
// Module: API Hub Domain Model
// Description: Projects, tasks, and the enumerations that classify tasks.
// Purpose: Define the records moved through the Kanban workflow.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Project`] groups API development [`Task`]s. Each task carries a
//! [`TaskStatus`] column on the board, an [`ApiType`], a [`Priority`], and an
//! optional [`Contract`]. Status moves freely between any two values; there is
//! no transition graph.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::contract::Contract;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::TaskId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error returned when parsing an enumeration from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value} (expected one of {expected})")]
pub struct ParseEnumError {
    /// Enumeration label.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
    /// Comma-separated accepted values.
    pub expected: &'static str,
}

// ============================================================================
// SECTION: Task Status
// ============================================================================

/// Board column for a task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Contract is being designed.
    #[default]
    Planning,
    /// Mock scenarios are being authored.
    Mocking,
    /// Real implementation in progress.
    Developing,
    /// Shipped; eligible for export.
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [Self; 4] = [Self::Planning, Self::Mocking, Self::Developing, Self::Done];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Mocking => "mocking",
            Self::Developing => "developing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == value).ok_or_else(|| {
            ParseEnumError {
                kind: "status",
                value: value.to_string(),
                expected: "planning, mocking, developing, done",
            }
        })
    }
}

// ============================================================================
// SECTION: API Type
// ============================================================================

/// Kind of API a task delivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiType {
    /// GraphQL operation.
    #[serde(rename = "graphql")]
    Graphql,
    /// REST endpoint.
    #[default]
    #[serde(rename = "rest")]
    Rest,
    /// Serverless edge function.
    #[serde(rename = "edge-function")]
    EdgeFunction,
    /// Workflow automation hook.
    #[serde(rename = "n8n")]
    N8n,
}

impl ApiType {
    /// All API types.
    pub const ALL: [Self; 4] = [Self::Graphql, Self::Rest, Self::EdgeFunction, Self::N8n];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Graphql => "graphql",
            Self::Rest => "rest",
            Self::EdgeFunction => "edge-function",
            Self::N8n => "n8n",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value).ok_or_else(|| ParseEnumError {
            kind: "api type",
            value: value.to_string(),
            expected: "graphql, rest, edge-function, n8n",
        })
    }
}

// ============================================================================
// SECTION: Priority
// ============================================================================

/// Task priority, `P0` most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    /// Critical.
    P0,
    /// High.
    P1,
    /// Normal.
    #[default]
    P2,
    /// Low.
    P3,
}

impl Priority {
    /// All priorities, most urgent first.
    pub const ALL: [Self; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|priority| priority.as_str() == value).ok_or_else(|| {
            ParseEnumError {
                kind: "priority",
                value: value.to_string(),
                expected: "P0, P1, P2, P3",
            }
        })
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// A named grouping of tasks, typically one product or service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Display name; also used as the OpenAPI title and tag.
    pub name: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional base endpoint URL, exported as the OpenAPI server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphql_endpoint: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// A unit of API development work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Short title; becomes the OpenAPI summary.
    pub title: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning project.
    pub project_id: ProjectId,
    /// Optional assignee label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Board column.
    pub status: TaskStatus,
    /// API kind.
    pub api_type: ApiType,
    /// Priority.
    pub priority: Priority,
    /// Optional endpoint path (for example `/users/{id}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Optional HTTP method, stored as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Optional request/response contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<Contract>,
    /// Optional creator label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last write time.
    pub updated_at: Timestamp,
}

impl Task {
    /// Returns the endpoint when present and non-empty.
    #[must_use]
    pub fn endpoint_path(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|endpoint| !endpoint.is_empty())
    }

    /// Returns the description when present and non-empty.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|text| !text.is_empty())
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

    use super::ApiType;
    use super::Priority;
    use super::TaskStatus;

    #[test]
    fn status_labels_parse_back() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn api_type_uses_hyphenated_wire_form() {
        let json = serde_json::to_string(&ApiType::EdgeFunction).unwrap();
        assert_eq!(json, "\"edge-function\"");
        assert_eq!("n8n".parse::<ApiType>().unwrap(), ApiType::N8n);
    }

    #[test]
    fn priority_rejects_lowercase() {
        let err = "p1".parse::<Priority>().unwrap_err();
        assert_eq!(err.kind, "priority");
        assert_eq!(serde_json::to_string(&Priority::P3).unwrap(), "\"P3\"");
    }
}
