// crates/api-hub-export/tests/markdown_export.rs
// ============================================================================
// Module: Markdown Export Tests
// Description: Verifies the Markdown summary layout byte for byte.
// ============================================================================
//! ## Overview
//! Renders small projects and compares against literal expected documents.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use api_hub_core::ApiType;
use api_hub_core::Contract;
use api_hub_core::Priority;
use api_hub_core::Project;
use api_hub_core::ProjectId;
use api_hub_core::Task;
use api_hub_core::TaskId;
use api_hub_core::TaskStatus;
use api_hub_core::Timestamp;
use api_hub_export::ExportFormat;
use api_hub_export::export_markdown;
use api_hub_export::render_export;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn generated_on() -> Timestamp {
    Timestamp::parse_rfc3339("2026-03-14T15:09:26Z").unwrap()
}

fn project(description: Option<&str>, endpoint: Option<&str>) -> Project {
    Project {
        id: ProjectId::new("p1"),
        name: "Billing".to_string(),
        description: description.map(str::to_string),
        graphql_endpoint: endpoint.map(str::to_string),
        created_at: Timestamp::from_unix_millis(0).unwrap(),
    }
}

fn task(title: &str, status: TaskStatus) -> Task {
    let at = Timestamp::from_unix_millis(0).unwrap();
    Task {
        id: TaskId::new(title),
        title: title.to_string(),
        description: None,
        project_id: ProjectId::new("p1"),
        assignee: None,
        status,
        api_type: ApiType::EdgeFunction,
        priority: Priority::P0,
        endpoint: None,
        method: None,
        contract: None,
        created_by: None,
        created_at: at,
        updated_at: at,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn empty_project_renders_header_and_footer() {
    let md = export_markdown(&project(None, None), &[], &generated_on()).unwrap();
    let expected = "# Billing API Documentation\n\n---\n\n## APIs\n\n\n*Generated on 2026-03-14*\n";
    assert_eq!(md, expected);
}

#[test]
fn full_task_section_layout() {
    let mut invoice = task("Create invoice", TaskStatus::Done);
    invoice.description = Some("Creates a draft invoice".to_string());
    invoice.endpoint = Some("/invoices".to_string());
    invoice.method = Some("post".to_string());
    invoice.contract = Some(Contract::new(json!({"request": {"body": {"amount": "number"}}})));
    let md = export_markdown(
        &project(Some("Money in"), Some("https://billing.example.com/graphql")),
        &[invoice],
        &generated_on(),
    )
    .unwrap();
    let expected = concat!(
        "# Billing API Documentation\n\n",
        "Money in\n\n",
        "**Endpoint:** `https://billing.example.com/graphql`\n\n",
        "---\n\n",
        "## APIs\n\n",
        "### Create invoice\n\n",
        "Creates a draft invoice\n\n",
        "**Endpoint:** `post /invoices`\n\n",
        "**Type:** edge-function\n\n",
        "**Priority:** P0\n\n",
        "#### Contract\n\n",
        "```json\n",
        "{\n  \"request\": {\n    \"body\": {\n      \"amount\": \"number\"\n    }\n  }\n}\n",
        "```\n\n",
        "---\n\n",
        "\n*Generated on 2026-03-14*\n",
    );
    assert_eq!(md, expected);
}

#[test]
fn done_tasks_without_endpoint_are_listed_and_others_skipped() {
    let tasks = vec![
        task("Sketch", TaskStatus::Planning),
        task("Shipped", TaskStatus::Done),
        task("Building", TaskStatus::Developing),
    ];
    let md = export_markdown(&project(None, None), &tasks, &generated_on()).unwrap();
    assert!(md.contains("### Shipped\n\n**Type:** edge-function\n\n**Priority:** P0\n\n---\n\n"));
    assert!(!md.contains("Sketch"));
    assert!(!md.contains("Building"));
}

#[test]
fn endpoint_defaults_method_to_get() {
    let mut listed = task("List", TaskStatus::Done);
    listed.endpoint = Some("/items".to_string());
    let md = export_markdown(&project(None, None), &[listed], &generated_on()).unwrap();
    assert!(md.contains("**Endpoint:** `GET /items`\n\n"));
}

#[test]
fn falsy_contracts_are_not_printed() {
    let mut nulled = task("Nulled", TaskStatus::Done);
    nulled.contract = Some(Contract::new(json!(null)));
    let mut empty_object = task("Empty", TaskStatus::Done);
    empty_object.contract = Some(Contract::new(json!({})));
    let md = export_markdown(&project(None, None), &[nulled, empty_object], &generated_on())
        .unwrap();
    assert_eq!(md.matches("#### Contract").count(), 1);
    assert!(md.contains("```json\n{}\n```"));
}

#[test]
fn render_export_dispatches_markdown() {
    let direct = export_markdown(&project(None, None), &[], &generated_on()).unwrap();
    let dispatched =
        render_export(ExportFormat::Markdown, &project(None, None), &[], &generated_on()).unwrap();
    assert_eq!(direct, dispatched);
}
