use axum::Json;
use axum::response::IntoResponse;

// health handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}
