//! Reference implementation of the remote notes service.

mod handlers;

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    Router::new()
        // Notes
        .route("/notes", get(handlers::list_notes).post(handlers::create_note))
        .route("/notes/{id}", delete(handlers::delete_note))
        // Health
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
