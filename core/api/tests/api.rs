use action_extractor_api::{router, AppState, Database};
use action_extractor_extraction::{HeuristicExtractor, LlmConfig, LlmExtractor};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;

fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("test.db")).unwrap();

    let state = AppState {
        db: Arc::new(Mutex::new(db)),
        heuristic: Arc::new(HeuristicExtractor::new()),
        // Unroutable backend so model calls fail fast
        llm: Arc::new(LlmExtractor::new(LlmConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            ..LlmConfig::default()
        })),
    };

    (router(state), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Error responses are plain strings, not JSON
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_stats_start_empty() {
    let (app, _dir) = test_app();

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], 0);
    assert_eq!(body["action_items"], 0);
}

#[tokio::test]
async fn test_create_and_fetch_note() {
    let (app, _dir) = test_app();

    let (status, note) = post_json(&app, "/notes", json!({"content": "  hello notes  "})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["content"], "hello notes");
    let id = note["id"].as_i64().unwrap();

    let (status, fetched) = get(&app, &format!("/notes/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["content"], "hello notes");

    let (status, listing) = get(&app, "/notes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["notes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_note_rejects_blank_content() {
    let (app, _dir) = test_app();

    let (status, _) = post_json(&app, "/notes", json!({"content": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_note_is_404() {
    let (app, _dir) = test_app();

    let (status, _) = get(&app, "/notes/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_extract_persists_and_links_items() {
    let (app, _dir) = test_app();

    let text = "- [ ] Set up database\n* implement API extract endpoint\n1. Write tests\nSome narrative sentence.";
    let (status, body) = post_json(
        &app,
        "/action-items/extract",
        json!({"text": text, "save_note": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let note_id = body["note_id"].as_i64().unwrap();

    let items = body["items"].as_array().unwrap();
    let texts: Vec<&str> = items.iter().map(|i| i["text"].as_str().unwrap()).collect();
    assert_eq!(
        texts,
        vec![
            "Set up database",
            "implement API extract endpoint",
            "Write tests"
        ]
    );

    // The saved note holds the original text
    let (status, note) = get(&app, &format!("/notes/{}", note_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["content"], text);

    // And the items are linked to it
    let (status, linked) = get(&app, &format!("/action-items?note_id={}", note_id)).await;
    assert_eq!(status, StatusCode::OK);
    let linked = linked.as_array().unwrap().clone();
    assert_eq!(linked.len(), 3);
    assert!(linked.iter().all(|i| i["note_id"] == note_id));
    assert!(linked.iter().all(|i| i["done"] == false));
}

#[tokio::test]
async fn test_extract_without_save_note() {
    let (app, _dir) = test_app();

    let (status, body) = post_json(
        &app,
        "/action-items/extract",
        json!({"text": "- Buy milk"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["note_id"].is_null());
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (_, items) = get(&app, "/action-items").await;
    assert!(items.as_array().unwrap()[0]["note_id"].is_null());
}

#[tokio::test]
async fn test_list_rejects_malformed_note_id_filter() {
    let (app, _dir) = test_app();

    post_json(&app, "/action-items/extract", json!({"text": "- Buy milk"})).await;

    // A bad filter must not fall back to the unfiltered listing
    let (status, _) = get(&app, "/action-items?note_id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, items) = get(&app, "/action-items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_extract_rejects_blank_text() {
    let (app, _dir) = test_app();

    let (status, _) = post_json(&app, "/action-items/extract", json!({"text": "  \n "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&app, "/action-items/extract-llm", json!({"text": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extract_llm_degrades_to_empty_items() {
    let (app, _dir) = test_app();

    // The model backend is unreachable; the endpoint still succeeds
    let (status, body) = post_json(
        &app,
        "/action-items/extract-llm",
        json!({"text": "- [ ] Buy milk", "save_note": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    // The note is still saved
    assert!(body["note_id"].as_i64().is_some());
}

#[tokio::test]
async fn test_mark_done_roundtrip() {
    let (app, _dir) = test_app();

    let (_, body) = post_json(
        &app,
        "/action-items/extract",
        json!({"text": "- Ship the release"}),
    )
    .await;
    let id = body["items"][0]["id"].as_i64().unwrap();

    // Done defaults to true when the body is empty
    let (status, done) = post_json(&app, &format!("/action-items/{}/done", id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["id"], id);
    assert_eq!(done["done"], true);

    let (_, item) = get(&app, &format!("/action-items/{}", id)).await;
    assert_eq!(item["done"], true);

    // And it can be toggled back
    let (status, undone) = post_json(
        &app,
        &format!("/action-items/{}/done", id),
        json!({"done": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(undone["done"], false);
}

#[tokio::test]
async fn test_mark_done_missing_is_404() {
    let (app, _dir) = test_app();

    let (status, _) = post_json(&app, "/action-items/12345/done", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_action_item_is_404() {
    let (app, _dir) = test_app();

    let (status, _) = get(&app, "/action-items/12345").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
