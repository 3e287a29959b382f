// crates/api-hub-core/src/core/contract.rs
// ============================================================================
// Module: API Hub Contracts
// Description: Opaque JSON contracts with read-only accessors.
// Purpose: Accept any syntactically valid JSON and expose conventional sections.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A contract is the declared request/response shape for a task's API. It is
//! stored as an opaque JSON value; only syntax is checked at the boundary. The
//! conventional layout is:
//!
//! ```json
//! {
//!   "request": { "headers": {}, "params": {}, "query": {}, "body": {} },
//!   "response": { "200": { "description": "OK", "body": {} } }
//! }
//! ```
//!
//! Accessors read these sections when they are objects and return `None`
//! otherwise. Nothing here rejects a contract for its shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error raised when opaque JSON text fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpaqueJsonError {
    /// Text is not syntactically valid JSON; carries the parser message.
    #[error("malformed json: {0}")]
    Malformed(String),
}

/// Parses text as an arbitrary JSON value.
///
/// # Errors
///
/// Returns [`OpaqueJsonError::Malformed`] with the parser's message.
pub fn parse_opaque_json(text: &str) -> Result<Value, OpaqueJsonError> {
    serde_json::from_str(text).map_err(|err| OpaqueJsonError::Malformed(err.to_string()))
}

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Opaque request/response contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contract(Value);

impl Contract {
    /// Wraps an already-parsed JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parses contract text.
    ///
    /// # Errors
    ///
    /// Returns [`OpaqueJsonError::Malformed`] when the text is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, OpaqueJsonError> {
        parse_opaque_json(text).map(Self)
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the contract and returns the JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns the `request` section when it is an object.
    #[must_use]
    pub fn request(&self) -> Option<&Map<String, Value>> {
        self.0.get("request").and_then(Value::as_object)
    }

    /// Returns `request.headers` when it is an object.
    #[must_use]
    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.request_section("headers")
    }

    /// Returns `request.params` when it is an object.
    #[must_use]
    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.request_section("params")
    }

    /// Returns `request.query` when it is an object.
    #[must_use]
    pub fn query(&self) -> Option<&Map<String, Value>> {
        self.request_section("query")
    }

    /// Returns `request.body` as stored, whatever its JSON type.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.request().and_then(|request| request.get("body"))
    }

    /// Returns the `response` section when it is an object.
    #[must_use]
    pub fn response(&self) -> Option<&Map<String, Value>> {
        self.0.get("response").and_then(Value::as_object)
    }

    /// Returns `request.body` only when it is a non-empty object, array, or string.
    #[must_use]
    pub fn non_empty_body(&self) -> Option<&Value> {
        self.body().filter(|body| match body {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(text) => !text.is_empty(),
            Value::Null | Value::Bool(_) | Value::Number(_) => false,
        })
    }

    /// Returns the path parameter definitions in key order.
    #[must_use]
    pub fn path_params(&self) -> Vec<ParameterDef<'_>> {
        self.params().map(ParameterDef::collect).unwrap_or_default()
    }

    /// Returns the query parameter definitions in key order.
    #[must_use]
    pub fn query_params(&self) -> Vec<ParameterDef<'_>> {
        self.query().map(ParameterDef::collect).unwrap_or_default()
    }

    /// Returns the declared responses, or `None` when no response object exists.
    #[must_use]
    pub fn responses(&self) -> Option<Vec<ResponseDef<'_>>> {
        self.response().map(|section| {
            section
                .iter()
                .map(|(code, entry)| ResponseDef {
                    code,
                    description: entry.get("description"),
                    body: entry.get("body"),
                })
                .collect()
        })
    }

    /// Returns a named object section under `request`.
    fn request_section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.request().and_then(|request| request.get(name)).and_then(Value::as_object)
    }
}

impl From<Value> for Contract {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// ============================================================================
// SECTION: Section Views
// ============================================================================

/// Borrowed view of one parameter entry (`params` or `query`).
///
/// Fields are passed through verbatim; absent fields stay `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDef<'a> {
    /// Parameter name (the entry key).
    pub name: &'a str,
    /// Raw `required` value.
    pub required: Option<&'a Value>,
    /// Raw `description` value.
    pub description: Option<&'a Value>,
    /// Raw `type` value.
    pub schema_type: Option<&'a Value>,
}

impl<'a> ParameterDef<'a> {
    /// Builds views for every entry of a parameter section.
    fn collect(section: &'a Map<String, Value>) -> Vec<Self> {
        section
            .iter()
            .map(|(name, entry)| Self {
                name,
                required: entry.get("required"),
                description: entry.get("description"),
                schema_type: entry.get("type"),
            })
            .collect()
    }
}

/// Borrowed view of one `response` entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseDef<'a> {
    /// Status code key as written.
    pub code: &'a str,
    /// Raw `description` value.
    pub description: Option<&'a Value>,
    /// Raw `body` value.
    pub body: Option<&'a Value>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
