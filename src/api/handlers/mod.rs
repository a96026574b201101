use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::db::Database;
use crate::models::{Note, NoteId};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Notes
// ============================================================

pub async fn list_notes(
    State(db): State<Database>,
) -> Result<Json<Vec<Note>>, (StatusCode, String)> {
    db.get_all_notes().map(Json).map_err(internal_error)
}

pub async fn create_note(
    State(db): State<Database>,
    Json(input): Json<Note>,
) -> Result<(StatusCode, Json<Note>), (StatusCode, String)> {
    if input.text.trim().is_empty() {
        tracing::warn!("Rejected note {} with blank text", input.id);
        return Err((StatusCode::BAD_REQUEST, "Note text is required".to_string()));
    }

    db.create_note(input)
        .map(|n| (StatusCode::CREATED, Json(n)))
        .map_err(internal_error)
}

pub async fn delete_note(
    State(db): State<Database>,
    Path(id): Path<NoteId>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_note(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Note not found".to_string()))
    }
}
