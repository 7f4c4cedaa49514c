use action_extractor_extraction::{HeuristicExtractor, LlmExtractor};
use action_extractor_schemas::{
    ActionItemId, ExtractLlmRequest, ExtractRequest, ExtractResponse, ExtractedItem,
    MarkDoneRequest, MarkDoneResponse, NoteCreate, NoteId, NoteListResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::database::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub heuristic: Arc<HeuristicExtractor>,
    pub llm: Arc<LlmExtractor>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/notes", post(create_note).get(list_notes))
        .route("/notes/:note_id", get(get_note))
        .route("/action-items/extract", post(extract))
        .route("/action-items/extract-llm", post(extract_llm))
        .route("/action-items", get(list_action_items))
        .route("/action-items/:item_id", get(get_action_item))
        .route("/action-items/:item_id/done", post(mark_done))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "action-extractor",
        "status": "healthy",
        "version": "0.1.0"
    }))
}

async fn get_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let db = state.db.lock().await;

    let note_count = db.count_notes().map_err(|e| {
        error!("Failed to count notes: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let item_count = db.count_action_items().map_err(|e| {
        error!("Failed to count action items: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "notes": note_count,
        "action_items": item_count
    })))
}

// ========== NOTES ==========

async fn create_note(
    State(state): State<AppState>,
    Json(payload): Json<NoteCreate>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "content must not be empty".to_string(),
        ));
    }

    let db = state.db.lock().await;
    let note = db.insert_note(content).map_err(|e| {
        error!("Failed to insert note: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!("Created note {}", note.id);
    Ok(Json(note))
}

async fn list_notes(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let db = state.db.lock().await;
    let notes = db.list_notes().map_err(|e| {
        error!("Failed to list notes: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(NoteListResponse { notes }))
}

async fn get_note(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let db = state.db.lock().await;
    let note = db.get_note(NoteId(note_id)).map_err(|e| {
        error!("Failed to get note: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    match note {
        Some(note) => Ok(Json(note)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Note {} not found", note_id),
        )),
    }
}

// ========== ACTION ITEMS ==========

async fn extract(
    State(state): State<AppState>,
    Json(payload): Json<ExtractRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let text = payload.text.trim().to_string();
    if text.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "text must not be empty".to_string(),
        ));
    }

    let items = state.heuristic.extract(&text);
    persist_extracted(&state, &text, payload.save_note, items).await
}

async fn extract_llm(
    State(state): State<AppState>,
    Json(payload): Json<ExtractLlmRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let text = payload.text.trim().to_string();
    if text.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "text must not be empty".to_string(),
        ));
    }

    // Model-path failures degrade to "no items"; the cause only gets logged
    let items = match state.llm.extract(&text, payload.model.as_deref()).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Model extraction failed, returning no items: {}", e);
            Vec::new()
        }
    };

    persist_extracted(&state, &text, payload.save_note, items).await
}

/// Shared tail of both extract endpoints: optionally save the note, then
/// store the items linked to it.
async fn persist_extracted(
    state: &AppState,
    text: &str,
    save_note: bool,
    items: Vec<String>,
) -> Result<Json<ExtractResponse>, (StatusCode, String)> {
    let mut db = state.db.lock().await;

    let note_id = if save_note {
        let note = db.insert_note(text).map_err(|e| {
            error!("Failed to insert note: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
        Some(note.id)
    } else {
        None
    };

    let ids = db.insert_action_items(&items, note_id).map_err(|e| {
        error!("Failed to insert action items: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!("Extracted {} action items", items.len());

    Ok(Json(ExtractResponse {
        note_id,
        items: ids
            .into_iter()
            .zip(items)
            .map(|(id, text)| ExtractedItem { id, text })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
struct ItemsQuery {
    note_id: Option<i64>,
}

async fn list_action_items(
    State(state): State<AppState>,
    // Non-optional so a malformed note_id is rejected instead of ignored
    Query(params): Query<ItemsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let db = state.db.lock().await;
    let items = db
        .list_action_items(params.note_id.map(NoteId))
        .map_err(|e| {
            error!("Failed to list action items: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(items))
}

async fn get_action_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let db = state.db.lock().await;
    let item = db.get_action_item(ActionItemId(item_id)).map_err(|e| {
        error!("Failed to get action item: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    match item {
        Some(item) => Ok(Json(item)),
        None => Err((
            StatusCode::NOT_FOUND,
            format!("Action item {} not found", item_id),
        )),
    }
}

async fn mark_done(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(payload): Json<MarkDoneRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let id = ActionItemId(item_id);

    let db = state.db.lock().await;
    let updated = db.mark_action_item_done(id, payload.done).map_err(|e| {
        error!("Failed to mark action item done: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    if !updated {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Action item {} not found", item_id),
        ));
    }

    Ok(Json(MarkDoneResponse {
        id,
        done: payload.done,
    }))
}
