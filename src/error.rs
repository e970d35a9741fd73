use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

// Handler-level failures. Upstream HTTP error statuses are not errors here;
// they pass through to the caller with their own status and headers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Upstream(e) => {
                error!(error = %e, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(serde_json::json!({ "error": "upstream_unreachable" })),
                )
                    .into_response()
            }
        }
    }
}
