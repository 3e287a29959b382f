// crates/api-hub-export/tests/openapi_export.rs
// ============================================================================
// Module: OpenAPI Export Tests
// Description: Verifies task filtering, grouping, and contract translation.
// ============================================================================
//! ## Overview
//! Checks the OpenAPI translator against hand-built projects and tasks,
//! comparing the rendered JSON tree with expected fragments.

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
use api_hub_export::export_file_name;
use api_hub_export::export_openapi_json;
use api_hub_export::export_openapi_yaml;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn project() -> Project {
    Project {
        id: ProjectId::new("p1"),
        name: "Shop".to_string(),
        description: Some("Storefront".to_string()),
        graphql_endpoint: Some("https://api.example.com".to_string()),
        created_at: Timestamp::from_unix_millis(0).unwrap(),
    }
}

fn task(id: &str, status: TaskStatus, endpoint: Option<&str>, method: Option<&str>) -> Task {
    let at = Timestamp::from_unix_millis(1_000).unwrap();
    Task {
        id: TaskId::new(id),
        title: format!("Task {id}"),
        description: None,
        project_id: ProjectId::new("p1"),
        assignee: None,
        status,
        api_type: ApiType::Rest,
        priority: Priority::P1,
        endpoint: endpoint.map(str::to_string),
        method: method.map(str::to_string),
        contract: None,
        created_by: None,
        created_at: at,
        updated_at: at,
    }
}

fn render(project: &Project, tasks: &[Task]) -> Value {
    serde_json::from_str(&export_openapi_json(project, tasks).unwrap()).unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn only_done_tasks_with_endpoints_are_exported() {
    let tasks = vec![
        task("a", TaskStatus::Done, Some("/a"), Some("GET")),
        task("b", TaskStatus::Developing, Some("/b"), Some("GET")),
        task("c", TaskStatus::Done, None, Some("GET")),
        task("d", TaskStatus::Done, Some(""), Some("GET")),
        task("e", TaskStatus::Planning, Some("/e"), None),
    ];
    let doc = render(&project(), &tasks);
    let paths = doc["paths"].as_object().unwrap();
    assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["/a"]);
}

#[test]
fn document_header_matches_project() {
    let doc = render(&project(), &[]);
    assert_eq!(doc["openapi"], json!("3.0.3"));
    assert_eq!(
        doc["info"],
        json!({"title": "Shop API", "version": "1.0.0", "description": "Storefront"})
    );
    assert_eq!(doc["servers"], json!([{"url": "https://api.example.com"}]));
    assert_eq!(doc["paths"], json!({}));
}

#[test]
fn empty_project_fields_are_omitted() {
    let mut bare = project();
    bare.description = Some(String::new());
    bare.graphql_endpoint = None;
    let doc = render(&bare, &[]);
    assert!(doc["info"].get("description").is_none());
    assert!(doc.get("servers").is_none());
}

#[test]
fn methods_are_lowercased_and_default_to_get() {
    let tasks = vec![
        task("a", TaskStatus::Done, Some("/items"), Some("POST")),
        task("b", TaskStatus::Done, Some("/items"), None),
        task("c", TaskStatus::Done, Some("/other"), Some("")),
    ];
    let doc = render(&project(), &tasks);
    assert!(doc["paths"]["/items"].get("post").is_some());
    assert!(doc["paths"]["/items"].get("get").is_some());
    assert!(doc["paths"]["/other"].get("get").is_some());
}

#[test]
fn later_task_wins_on_same_path_and_method() {
    let tasks = vec![
        task("first", TaskStatus::Done, Some("/users"), Some("get")),
        task("second", TaskStatus::Done, Some("/users"), Some("GET")),
    ];
    let doc = render(&project(), &tasks);
    assert_eq!(doc["paths"]["/users"]["get"]["summary"], json!("Task second"));
    assert_eq!(doc["paths"]["/users"].as_object().unwrap().len(), 1);
}

#[test]
fn default_response_is_synthesized_without_contract_responses() {
    let mut with_request_only = task("r", TaskStatus::Done, Some("/r"), None);
    with_request_only.contract = Some(Contract::new(json!({"request": {"body": {}}})));
    let mut non_object = task("n", TaskStatus::Done, Some("/n"), None);
    non_object.contract = Some(Contract::new(json!({"response": "see docs"})));
    let bare = task("b", TaskStatus::Done, Some("/b"), None);

    let doc = render(&project(), &[with_request_only, non_object, bare]);
    for path in ["/r", "/n", "/b"] {
        let operation = &doc["paths"][path]["get"];
        assert_eq!(operation["responses"], json!({"200": {"description": "Success"}}));
        assert!(operation.get("requestBody").is_none());
        assert!(operation.get("parameters").is_none());
    }
}

#[test]
fn operation_fields_follow_contract() {
    let mut full = task("u", TaskStatus::Done, Some("/users/{id}"), Some("PUT"));
    full.description = Some("Update a user".to_string());
    full.contract = Some(Contract::new(json!({
        "request": {
            "params": {"id": {"type": "string", "required": true, "description": "User id"}},
            "query": {"dryRun": {"type": "boolean"}},
            "body": {"name": "string"}
        },
        "response": {
            "200": {"description": "Updated", "body": {"id": "string"}},
            "404": {"description": "Missing"}
        }
    })));
    let doc = render(&project(), &[full]);
    let operation = &doc["paths"]["/users/{id}"]["put"];
    assert_eq!(operation["summary"], json!("Task u"));
    assert_eq!(operation["description"], json!("Update a user"));
    assert_eq!(operation["tags"], json!(["Shop"]));
    assert_eq!(
        operation["parameters"],
        json!([
            {
                "name": "id",
                "in": "path",
                "required": true,
                "description": "User id",
                "schema": {"type": "string"}
            },
            {"name": "dryRun", "in": "query", "schema": {"type": "boolean"}}
        ])
    );
    assert_eq!(
        operation["requestBody"],
        json!({"content": {"application/json": {"schema": {"name": "string"}}}})
    );
    assert_eq!(
        operation["responses"],
        json!({
            "200": {
                "description": "Updated",
                "content": {"application/json": {"schema": {"id": "string"}}}
            },
            "404": {"description": "Missing", "content": {"application/json": {}}}
        })
    );
}

#[test]
fn json_and_yaml_encode_the_same_tree() {
    let mut documented = task("y", TaskStatus::Done, Some("/y"), Some("DELETE"));
    documented.contract = Some(Contract::new(json!({
        "request": {"query": {"force": {"type": "boolean", "required": false}}},
        "response": {"204": {"description": "Gone", "body": null}}
    })));
    let tasks = vec![documented, task("z", TaskStatus::Done, Some("/z"), None)];
    let from_json: Value =
        serde_json::from_str(&export_openapi_json(&project(), &tasks).unwrap()).unwrap();
    let from_yaml: Value =
        serde_yaml::from_str(&export_openapi_yaml(&project(), &tasks).unwrap()).unwrap();
    assert_eq!(from_json, from_yaml);
}

#[test]
fn json_is_two_space_pretty_printed() {
    let text = export_openapi_json(&project(), &[]).unwrap();
    assert!(text.starts_with("{\n  \"openapi\": \"3.0.3\",\n  \"info\": {\n    \"title\""));
}

#[test]
fn file_names_carry_project_and_date() {
    let date = Timestamp::from_unix_millis(1_767_225_600_000).unwrap();
    let mut spaced = project();
    spaced.name = "My Shop\"".to_string();
    let name = |project: &Project, format| export_file_name(project, format, &date);
    assert_eq!(name(&project(), ExportFormat::OpenApiJson), "Shop-api-2026-01-01.json");
    assert_eq!(name(&project(), ExportFormat::OpenApiYaml), "Shop-api-2026-01-01.yaml");
    assert_eq!(name(&spaced, ExportFormat::Markdown), "My-Shop--api-2026-01-01.md");
}
