use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;

use crate::aggregator::{
    CollectionsCache, DEFAULT_LIMIT, filter_entries, merge_catalog, sample_collection_counts,
};
use crate::error::AppError;
use crate::metrics::{COLLECTIONS_CACHE_HITS, COLLECTIONS_CACHE_MISSES, REQUEST_TOTAL};
use crate::models::CollectionsResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CollectionsQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

// GET /proxy/meta/collections - serve the cached catalog, rebuilding it from
// sampled listing pages when the TTL has lapsed. Two requests racing past an
// expired cache both rebuild; the result is idempotent and the last write wins.
pub async fn collections_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CollectionsQuery>,
) -> Result<Json<CollectionsResponse>, AppError> {
    REQUEST_TOTAL.inc();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    {
        let cache = state.collections.read().await;
        if let Some(cache) = cache.as_ref() {
            if cache.is_fresh() {
                COLLECTIONS_CACHE_HITS.inc();
                return Ok(Json(CollectionsResponse {
                    data: filter_entries(&cache.entries, query.q.as_deref(), limit),
                    fetched_at: cache.fetched_at,
                    ttl_ms: cache.ttl_ms(),
                }));
            }
        }
    }

    COLLECTIONS_CACHE_MISSES.inc();
    let counts = sample_collection_counts(&state.upstream).await?;
    let entries = merge_catalog(state.resolver.entries(), &counts);
    info!(
        catalog = state.resolver.entries().len(),
        sampled = counts.len(),
        total = entries.len(),
        "rebuilt collections cache"
    );

    let rebuilt = CollectionsCache::new(entries, state.collections_ttl);
    let response = CollectionsResponse {
        data: filter_entries(&rebuilt.entries, query.q.as_deref(), limit),
        fetched_at: rebuilt.fetched_at,
        ttl_ms: rebuilt.ttl_ms(),
    };
    *state.collections.write().await = Some(rebuilt);

    Ok(Json(response))
}
