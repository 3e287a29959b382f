// crates/api-hub-export/src/markdown.rs
// ============================================================================
// Module: Markdown Exporter
// Description: Human-readable summary of a project's finished APIs.
// Purpose: Render done tasks as a Markdown document with a dated footer.
// Dependencies: api-hub-core, serde_json
// ============================================================================

//! ## Overview
//! Every `done` task is listed, with or without an endpoint. The generation
//! date is supplied by the caller so that identical inputs render to
//! identical bytes. Contracts are embedded as 2-space pretty JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use api_hub_core::Project;
use api_hub_core::Task;
use api_hub_core::TaskStatus;
use api_hub_core::Timestamp;
use serde_json::Value;

use crate::ExportError;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the Markdown summary for a project's done tasks.
///
/// # Errors
///
/// Returns [`ExportError::Json`] when a contract cannot be pretty-printed.
pub fn export_markdown(
    project: &Project,
    tasks: &[Task],
    generated_on: &Timestamp,
) -> Result<String, ExportError> {
    let mut md = format!("# {} API Documentation\n\n", project.name);
    if let Some(description) = project.description.as_deref().filter(|text| !text.is_empty()) {
        md.push_str(description);
        md.push_str("\n\n");
    }
    if let Some(endpoint) = project.graphql_endpoint.as_deref().filter(|text| !text.is_empty()) {
        md.push_str(&format!("**Endpoint:** `{endpoint}`\n\n"));
    }
    md.push_str("---\n\n");
    md.push_str("## APIs\n\n");

    for task in tasks.iter().filter(|task| task.status == TaskStatus::Done) {
        render_task(&mut md, task)?;
    }

    md.push_str(&format!("\n*Generated on {}*\n", generated_on.date_string()));
    Ok(md)
}

/// Appends one task section.
fn render_task(md: &mut String, task: &Task) -> Result<(), ExportError> {
    md.push_str(&format!("### {}\n\n", task.title));
    if let Some(description) = task.description_text() {
        md.push_str(description);
        md.push_str("\n\n");
    }
    if let Some(endpoint) = task.endpoint_path() {
        let method = task.method.as_deref().filter(|method| !method.is_empty()).unwrap_or("GET");
        md.push_str(&format!("**Endpoint:** `{method} {endpoint}`\n\n"));
    }
    md.push_str(&format!("**Type:** {}\n\n", task.api_type));
    md.push_str(&format!("**Priority:** {}\n\n", task.priority));
    let contract = task.contract.as_ref().filter(|contract| is_truthy(contract.as_value()));
    if let Some(contract) = contract {
        let pretty = serde_json::to_string_pretty(contract.as_value())
            .map_err(|err| ExportError::Json(err.to_string()))?;
        md.push_str("#### Contract\n\n");
        md.push_str("```json\n");
        md.push_str(&pretty);
        md.push_str("\n```\n\n");
    }
    md.push_str("---\n\n");
    Ok(())
}

/// Returns false for `null`, `false`, zero, and the empty string.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
