use std::path::Path;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::aggregator::CollectionsCache;
use crate::config::Args;
use crate::rate_limit::RateLimiter;
use crate::resolver::CollectionResolver;
use crate::upstream::UpstreamClient;

// app's shared state
pub struct AppState {
    pub upstream: UpstreamClient,
    pub resolver: CollectionResolver,
    pub rate_limiter: RateLimiter,
    // None until the first rebuild; replaced wholesale, last writer wins
    pub collections: RwLock<Option<CollectionsCache>>,
    pub collections_ttl: Duration,
}

impl AppState {
    pub fn new(args: &Args) -> Self {
        Self {
            upstream: UpstreamClient::new(&args.upstream_base, args.api_key.clone()),
            resolver: CollectionResolver::load(Path::new(&args.collections_file)),
            rate_limiter: RateLimiter::new(args.rate_limit, Duration::from_secs(args.rate_window)),
            collections: RwLock::new(None),
            collections_ttl: Duration::from_secs(args.collections_ttl),
        }
    }
}
