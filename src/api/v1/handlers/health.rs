/*
 * Responsibility
 * - GET / (banner), GET /health (疎通用)
 * - guard を通さない public route
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn banner() -> &'static str {
    "blood wave is running"
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
