use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("gateway_requests_total", "Total proxied requests").unwrap();
    pub static ref RATE_LIMITED: Counter = register_counter!(
        "gateway_rate_limited_total",
        "Requests rejected by the local rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_RETRIES: Counter = register_counter!(
        "gateway_upstream_retries_total",
        "Retried upstream attempts (429/5xx)"
    )
    .unwrap();
    pub static ref COLLECTIONS_CACHE_HITS: Counter = register_counter!(
        "gateway_collections_cache_hits_total",
        "Collection queries served from cache"
    )
    .unwrap();
    pub static ref COLLECTIONS_CACHE_MISSES: Counter = register_counter!(
        "gateway_collections_cache_misses_total",
        "Collection cache rebuilds"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "gateway_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
}
