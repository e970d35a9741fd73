use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::extract::{extract_items, next_cursor};
use crate::metrics::REQUEST_TOTAL;
use crate::resolver::CANONICAL_PREFIX;
use crate::state::AppState;

const LISTINGS_PATH: &str = "/api/v1/listings";

pub const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

// GET /proxy/listings - forward the query, resolving a human-entered
// collection filter to its canonical id, and normalize whatever body shape
// the upstream returns into {"data": [...], "cursor"?}.
pub async fn listings_handler(
    State(state): State<Arc<AppState>>,
    Query(mut params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    REQUEST_TOTAL.inc();

    for (key, value) in params.iter_mut() {
        if key == "collection" && !value.starts_with(CANONICAL_PREFIX) {
            *value = state.resolver.resolve(value);
        }
    }

    let res = state.upstream.get(LISTINGS_PATH, &params).await?;
    let status = res.status();
    let retry_after = res.headers().get(header::RETRY_AFTER).cloned();
    let cursor = next_cursor(res.headers());

    let text = res.text().await?;
    let parsed: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
    let items = extract_items(&parsed);

    let mut body = json!({ "data": items });
    if let Some(c) = &cursor {
        body["cursor"] = json!(c);
    }

    let mut headers = HeaderMap::new();
    if let Some(ra) = retry_after {
        headers.insert(header::RETRY_AFTER, ra);
    }
    if let Some(c) = &cursor {
        if let Ok(value) = HeaderValue::from_str(c) {
            headers.insert(HeaderName::from_static(NEXT_CURSOR_HEADER), value);
        }
    }

    Ok((status, headers, Json(body)).into_response())
}

// GET /proxy/listings/{id} - passthrough of the single-item endpoint; only a
// small allow-list of headers is copied.
pub async fn get_listing_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    REQUEST_TOTAL.inc();

    let path = format!("{}/{}", LISTINGS_PATH, urlencoding::encode(&id));
    let res = state.upstream.get(&path, &[]).await?;
    let status = res.status();

    let mut headers = HeaderMap::new();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Some(ra) = res.headers().get(header::RETRY_AFTER) {
        headers.insert(header::RETRY_AFTER, ra.clone());
    }
    if let Some(c) = next_cursor(res.headers()) {
        if let Ok(value) = HeaderValue::from_str(&c) {
            headers.insert(HeaderName::from_static(NEXT_CURSOR_HEADER), value);
        }
    }

    let body = res.text().await?;
    Ok((status, headers, body).into_response())
}
