//! HTTP route table binding handlers to the API surface.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use crate::AppState;

use super::files;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/upload", post(files::upload_files))
        .route("/files", get(files::list_files))
        .route("/files/:id/download", get(files::download_file))
        .route("/files/:id", delete(files::delete_file))
}

async fn handle_root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "app": state.app_name,
        "version": state.version,
        "endpoints": {
            "health": "/health",
            "upload": "POST /upload",
            "files": "GET /files",
            "download": "GET /files/{id}/download",
            "delete": "DELETE /files/{id}"
        }
    }))
}

async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.file_store.storage_stats().await.ok();

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "storage": stats.map(|s| serde_json::json!({
            "file_count": s.file_count,
            "total_size": s.total_size,
        })),
    }))
}
