// crates/api-hub-export/src/openapi.rs
// ============================================================================
// Module: OpenAPI Translator
// Description: Maps a project's finished tasks onto an OpenAPI 3.0.3 document.
// Purpose: Produce one typed document shared by the JSON and YAML encoders.
// Dependencies: api-hub-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Only tasks in the `done` column with a non-empty endpoint are exported;
//! every other task is skipped without error. Operations are grouped by path
//! and lower-cased method, and a later task with the same pair replaces the
//! earlier one. Contract sections are read through the core accessors and
//! passed through verbatim: absent fields stay absent, never `null`.
//!
//! Paths, methods, response codes, and parameter names are emitted in sorted
//! order so identical inputs always encode to identical text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use api_hub_core::Contract;
use api_hub_core::ParameterDef;
use api_hub_core::Project;
use api_hub_core::Task;
use api_hub_core::TaskStatus;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Document version emitted in `info.version`.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Media type used for request and response bodies.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Method used when a task names none.
const DEFAULT_METHOD: &str = "get";

/// Response code synthesized when a contract declares no responses.
const DEFAULT_RESPONSE_CODE: &str = "200";

/// Description of the synthesized default response.
const DEFAULT_RESPONSE_DESCRIPTION: &str = "Success";

// ============================================================================
// SECTION: Document Types
// ============================================================================

/// OpenAPI document root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApiDocument {
    /// OpenAPI version string.
    pub openapi: String,
    /// Document metadata.
    pub info: Info,
    /// Optional server list (at most one entry).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Operations keyed by path, then lower-case method.
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    /// `{project} API`.
    pub title: String,
    /// Document version.
    pub version: String,
    /// Project description when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    /// Base URL.
    pub url: String,
}

/// One path operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// Task title.
    pub summary: String,
    /// Task description when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Single tag: the project name.
    pub tags: Vec<String>,
    /// Path then query parameters; omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// JSON request body when the contract declares a non-empty one.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path segment.
    Path,
    /// Query string.
    Query,
}

/// Operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Raw `required` value from the contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Value>,
    /// Raw `description` value from the contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// Schema carrying the raw `type` value.
    pub schema: ParameterSchema,
}

/// Parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    /// Raw `type` value from the contract.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<Value>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// Content keyed by media type.
    pub content: BTreeMap<String, MediaType>,
}

/// Media type entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    /// Raw schema value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// Response entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Raw description value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// JSON content; absent on the synthesized default response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Builds the OpenAPI document for a project's tasks.
#[must_use]
pub fn generate_openapi(project: &Project, tasks: &[Task]) -> OpenApiDocument {
    let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
    for task in tasks.iter().filter(|task| task.status == TaskStatus::Done) {
        let Some(endpoint) = task.endpoint_path() else {
            continue;
        };
        paths
            .entry(endpoint.to_string())
            .or_default()
            .insert(operation_method(task), build_operation(project, task));
    }
    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: format!("{} API", project.name),
            version: DOCUMENT_VERSION.to_string(),
            description: non_empty(project.description.as_deref()),
        },
        servers: non_empty(project.graphql_endpoint.as_deref()).map(|url| vec![Server { url }]),
        paths,
    }
}

/// Returns the lower-cased method, defaulting to `get`.
fn operation_method(task: &Task) -> String {
    task.method
        .as_deref()
        .filter(|method| !method.is_empty())
        .map_or_else(|| DEFAULT_METHOD.to_string(), str::to_lowercase)
}

/// Builds one operation from a task.
fn build_operation(project: &Project, task: &Task) -> Operation {
    let contract = task.contract.as_ref();
    let parameters: Vec<Parameter> = contract
        .map(|contract| {
            let path = contract
                .path_params()
                .into_iter()
                .map(|def| parameter(def, ParameterLocation::Path));
            let query = contract
                .query_params()
                .into_iter()
                .map(|def| parameter(def, ParameterLocation::Query));
            path.chain(query).collect()
        })
        .unwrap_or_default();
    Operation {
        summary: task.title.clone(),
        description: task.description_text().map(str::to_string),
        tags: vec![project.name.clone()],
        parameters: (!parameters.is_empty()).then_some(parameters),
        request_body: contract.and_then(Contract::non_empty_body).map(|body| RequestBody {
            content: json_content(Some(body.clone())),
        }),
        responses: contract.map_or_else(default_responses, build_responses),
    }
}

/// Converts a contract parameter view into an OpenAPI parameter.
fn parameter(def: ParameterDef<'_>, location: ParameterLocation) -> Parameter {
    Parameter {
        name: def.name.to_string(),
        location,
        required: def.required.cloned(),
        description: def.description.cloned(),
        schema: ParameterSchema { schema_type: def.schema_type.cloned() },
    }
}

/// Builds the response map from a contract, or the default when none is declared.
fn build_responses(contract: &Contract) -> BTreeMap<String, Response> {
    let Some(declared) = contract.responses() else {
        return default_responses();
    };
    declared
        .into_iter()
        .map(|def| {
            let response = Response {
                description: def.description.cloned(),
                content: Some(json_content(def.body.cloned())),
            };
            (def.code.to_string(), response)
        })
        .collect()
}

/// Returns `{"200": {"description": "Success"}}`.
fn default_responses() -> BTreeMap<String, Response> {
    BTreeMap::from([(
        DEFAULT_RESPONSE_CODE.to_string(),
        Response {
            description: Some(Value::String(DEFAULT_RESPONSE_DESCRIPTION.to_string())),
            content: None,
        },
    )])
}

/// Wraps a schema as `application/json` content.
fn json_content(schema: Option<Value>) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

/// Returns owned text when present and non-empty.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|text| !text.is_empty()).map(str::to_string)
}
