// crates/api-hub-export/src/lib.rs
// ============================================================================
// Module: API Hub Export Library
// Description: Deterministic OpenAPI (JSON/YAML) and Markdown exporters.
// Purpose: Turn a project's finished tasks into downloadable documentation.
// Dependencies: api-hub-core, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! This crate renders a project and its tasks into three artifacts: an
//! OpenAPI 3.0.3 document encoded as JSON or YAML, and a Markdown summary.
//! The JSON and YAML encodings serialize the same typed
//! [`OpenApiDocument`](openapi::OpenApiDocument), so they always parse to the
//! same tree.
//!
//! ### Design Notes
//! - Exporters never fail on task content; malformed or partial contracts are
//!   passed through or skipped. The only errors are serializer failures.
//! - Output is deterministic: map keys are sorted and the Markdown generation
//!   date is an explicit input.
//!
//! ## Index
//! - Translator: [`generate_openapi`]
//! - Encoders: [`export_openapi_json`], [`export_openapi_yaml`], [`export_markdown`]
//! - Downloads: [`ExportFormat`], [`export_file_name`], [`render_export`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod markdown;
pub mod openapi;

// ============================================================================
// SECTION: Imports
// ============================================================================

use api_hub_core::Project;
use api_hub_core::Task;
use api_hub_core::Timestamp;
use thiserror::Error;

pub use crate::markdown::export_markdown;
pub use crate::openapi::OpenApiDocument;
pub use crate::openapi::generate_openapi;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the exporters.
///
/// # Invariants
/// - Variant meanings are stable for automation and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(String),
    /// YAML serialization error.
    #[error("yaml error: {0}")]
    Yaml(String),
}

// ============================================================================
// SECTION: Encoders
// ============================================================================

/// Renders the OpenAPI document as 2-space pretty JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] when serialization fails.
pub fn export_openapi_json(project: &Project, tasks: &[Task]) -> Result<String, ExportError> {
    serde_json::to_string_pretty(&generate_openapi(project, tasks))
        .map_err(|err| ExportError::Json(err.to_string()))
}

/// Renders the OpenAPI document as YAML.
///
/// # Errors
///
/// Returns [`ExportError::Yaml`] when serialization fails.
pub fn export_openapi_yaml(project: &Project, tasks: &[Task]) -> Result<String, ExportError> {
    serde_yaml::to_string(&generate_openapi(project, tasks))
        .map_err(|err| ExportError::Yaml(err.to_string()))
}

// ============================================================================
// SECTION: Downloads
// ============================================================================

/// Export artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// OpenAPI as JSON.
    OpenApiJson,
    /// OpenAPI as YAML.
    OpenApiYaml,
    /// Markdown summary.
    Markdown,
}

impl ExportFormat {
    /// All formats.
    pub const ALL: [Self; 3] = [Self::OpenApiJson, Self::OpenApiYaml, Self::Markdown];

    /// Returns the file extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::OpenApiJson => "json",
            Self::OpenApiYaml => "yaml",
            Self::Markdown => "md",
        }
    }

    /// Returns the HTTP content type.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::OpenApiJson => "application/json",
            Self::OpenApiYaml => "application/yaml",
            Self::Markdown => "text/markdown; charset=utf-8",
        }
    }
}

/// Renders one export artifact.
///
/// # Errors
///
/// Returns [`ExportError`] when serialization fails.
pub fn render_export(
    format: ExportFormat,
    project: &Project,
    tasks: &[Task],
    generated_on: &Timestamp,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::OpenApiJson => export_openapi_json(project, tasks),
        ExportFormat::OpenApiYaml => export_openapi_yaml(project, tasks),
        ExportFormat::Markdown => export_markdown(project, tasks, generated_on),
    }
}

/// Returns `{project}-api-{YYYY-MM-DD}.{ext}`.
///
/// Characters outside `[A-Za-z0-9._-]` in the project name become `-` so the
/// name is safe in a `Content-Disposition` header and on disk.
#[must_use]
pub fn export_file_name(
    project: &Project,
    format: ExportFormat,
    generated_on: &Timestamp,
) -> String {
    let stem: String = project
        .name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') { ch } else { '-' }
        })
        .collect();
    format!("{stem}-api-{}.{}", generated_on.date_string(), format.extension())
}
