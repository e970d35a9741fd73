pub mod aggregator;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod resolver;
pub mod state;
pub mod upstream;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use tracing::info;

use crate::metrics::REQUEST_LATENCY;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    // only the proxy routes sit behind the rate limiter
    let proxy = Router::new()
        .route("/listings", get(handlers::listings_handler))
        .route("/listings/{id}", get(handlers::get_listing_handler))
        .route("/meta/collections", get(handlers::collections_handler))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::gate_proxy));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/proxy", proxy)
        .layer(middleware::from_fn(track_request))
        .with_state(state)
}

// One structured log line per request, plus the latency histogram.
async fn track_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let res = next.run(req).await;

    let elapsed = start.elapsed();
    REQUEST_LATENCY.observe(elapsed.as_secs_f64());
    info!(
        %method,
        path,
        status = res.status().as_u16(),
        ms = elapsed.as_millis() as u64,
        "request"
    );
    res
}
