//! Integration tests for the dialogue HTTP API.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, backed
//! by the local collaborator and an in-memory session store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use formfill::adapters::collaborator::LocalFormCollaborator;
use formfill::adapters::document::FormDocumentWriter;
use formfill::adapters::http::{api_router, DialogHandlers};
use formfill::adapters::storage::InMemorySessionStore;
use formfill::application::{DialogService, SessionController};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app(dir: &TempDir) -> Router {
    app_with_prefix(dir, "/download")
}

fn app_with_prefix(dir: &TempDir, download_prefix: &str) -> Router {
    let writer = FormDocumentWriter::new(dir.path(), download_prefix);
    let collaborator = Arc::new(LocalFormCollaborator::new(writer.clone()));
    let service = Arc::new(DialogService::new(
        SessionController::new(collaborator),
        Arc::new(InMemorySessionStore::new()),
    ));
    api_router(DialogHandlers::new(service, Arc::new(writer)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn start(app: &Router, fields: Value) -> String {
    let (status, body) = send(app, "POST", "/sessions", Some(json!({ "fields": fields }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

async fn input(app: &Router, id: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", &format!("/sessions/{}/input", id), Some(body)).await
}

// =============================================================================
// Endpoints
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(&app(&dir), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn start_session_returns_first_prompt() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = send(
        &app,
        "POST",
        "/sessions",
        Some(json!({ "fields": ["Name", "Age"] })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["fields"], json!(["Name", "Age"]));
    let prompt = &body["directives"][0];
    assert_eq!(prompt["type"], "prompt_field");
    assert_eq!(prompt["field"], "Name");
    assert_eq!(prompt["speech"], "Please enter Name.");
}

#[tokio::test]
async fn empty_field_list_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let (status, body) = send(
        &app(&dir),
        "POST",
        "/sessions",
        Some(json!({ "fields": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FIELD_LIST");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = send(&app, "GET", "/sessions/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SESSION_NOT_FOUND");

    let (status, _) = input(&app, "nope", json!({ "text": "hi" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn input_needs_text_or_action() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let id = start(&app, json!(["Name"])).await;

    let (status, body) = input(&app, &id, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn finalize_before_confirmation_conflicts() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let id = start(&app, json!(["Name"])).await;

    let (status, body) = send(&app, "POST", &format!("/sessions/{}/finalize", id), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_CONFIRMED");
}

#[tokio::test]
async fn download_rejects_traversal() {
    let dir = TempDir::new().unwrap();
    let (status, _) = send(&app(&dir), "GET", "/download/..", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nested_download_prefix_mounts_beside_api_routes() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("s1_filled.md"), "Name: ___A___\n\n").unwrap();

    for prefix in ["/files/forms", "/files/forms/"] {
        let app = app_with_prefix(&dir, prefix);

        let (status, _) = send(&app, "GET", "/files/forms/s1_filled.md", None).await;
        assert_eq!(status, StatusCode::OK, "{prefix}");
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

// =============================================================================
// Full flow
// =============================================================================

#[tokio::test]
async fn fill_review_correct_and_download() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let id = start(&app, json!(["Name", "Gender"])).await;

    let (status, body) = input(&app, &id, json!({ "text": "alice" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "collecting");
    assert_eq!(body["directives"][1]["field"], "Gender");

    let (_, body) = input(&app, &id, json!({ "text": "f" })).await;
    assert_eq!(body["phase"], "review_confirm");
    let review = body["directives"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["type"] == "show_review")
        .cloned()
        .unwrap();
    assert_eq!(review["speech"], "Name: Alice. Gender: Female");

    let (_, body) = input(&app, &id, json!({ "action": "decline" })).await;
    assert_eq!(body["phase"], "review_await_field");
    assert_eq!(body["directives"][0]["valid_names"], json!(["Name", "Gender"]));

    let (_, body) = input(&app, &id, json!({ "text": "NAME" })).await;
    assert_eq!(body["phase"], "review_await_value");
    assert_eq!(body["directives"][0]["speech"], "Enter new value for Name");

    let (_, body) = input(&app, &id, json!({ "text": "alicia" })).await;
    assert_eq!(body["phase"], "review_confirm");
    assert_eq!(body["directives"][0]["message"], "Updated \"Name\" to: Alicia");

    let (status, session) = send(&app, "GET", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["entries"][0]["value"], "Alicia");
    assert_eq!(session["confirmed"], false);

    let (_, body) = input(&app, &id, json!({ "action": "confirm" })).await;
    assert_eq!(body["directives"][0]["type"], "ready_to_submit");

    let (status, body) = send(&app, "POST", &format!("/sessions/{}/finalize", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["document_url"].as_str().unwrap().to_string();
    assert_eq!(url, format!("/download/{}_filled.md", id));

    let response = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        String::from_utf8(bytes.to_vec()).unwrap(),
        "Name: ___Alicia___\n\nGender: ___Female___\n\n"
    );

    let (status, _) = send(&app, "GET", &format!("/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
