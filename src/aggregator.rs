//! Approximate collection catalog built by sampling listing pages.
//!
//! The upstream has no "list collections with counts" endpoint, so the
//! aggregator walks a bounded number of listing pages, counts the collection
//! names it sees, and merges those counts into the static catalog. Counts are
//! advisory UI filter hints, not statistics; the whole result is cached and
//! rebuilt from scratch on expiry.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use crate::extract::{extract_items, next_cursor};
use crate::models::{CatalogEntry, CollectionEntry};
use crate::upstream::UpstreamClient;

const LISTINGS_PATH: &str = "/api/v1/listings";

// Sampling bounds: at most 30 pages of up to 50 items, capped at 2500 items.
const PAGE_LIMIT: usize = 50;
const MAX_PAGES: usize = 30;
const MAX_ITEMS: usize = 2500;

pub const DEFAULT_LIMIT: usize = 200;

// The cached catalog. Either fresh and servable or superseded wholesale by
// the next rebuild; entries are never patched in place.
pub struct CollectionsCache {
    pub entries: Vec<CollectionEntry>,
    pub fetched_at: DateTime<Utc>,
    expires_at: Instant,
}

impl CollectionsCache {
    pub fn new(entries: Vec<CollectionEntry>, ttl: Duration) -> Self {
        Self {
            entries,
            fetched_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }

    pub fn ttl_ms(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_millis() as u64
    }
}

// Walk listing pages via the cursor and count distinct collection names.
pub async fn sample_collection_counts(
    upstream: &UpstreamClient,
) -> Result<HashMap<String, u64>, reqwest::Error> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut cursor: Option<String> = None;
    let mut sampled = 0usize;

    for page in 0..MAX_PAGES {
        let mut query = vec![("limit".to_string(), PAGE_LIMIT.to_string())];
        if let Some(c) = &cursor {
            query.push(("cursor".to_string(), c.clone()));
        }

        let res = upstream.get(LISTINGS_PATH, &query).await?;
        let next = next_cursor(res.headers());
        let text = res.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        let items = extract_items(&body);
        if items.is_empty() {
            break;
        }
        for item in items {
            if let Some(name) = item.pointer("/item/collection").and_then(Value::as_str) {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        sampled += items.len();
        if sampled >= MAX_ITEMS {
            break;
        }

        match next {
            Some(c) => cursor = Some(c),
            None => break,
        }

        if page + 1 == MAX_PAGES {
            info!(sampled, "collection sampling hit the page cap");
        }
    }

    Ok(counts)
}

// Merge sampled counts into the static catalog: every catalog entry is kept
// (count attached when its display name was sampled), and sampled names the
// catalog does not know are appended without an api_id so new collections
// still surface.
pub fn merge_catalog(entries: &[CatalogEntry], counts: &HashMap<String, u64>) -> Vec<CollectionEntry> {
    let mut merged = Vec::with_capacity(entries.len() + counts.len());
    let mut matched: HashSet<&str> = HashSet::new();

    for entry in entries {
        let count = entry.name.as_deref().and_then(|name| counts.get(name).copied());
        if count.is_some() {
            if let Some(name) = entry.name.as_deref() {
                matched.insert(name);
            }
        }
        merged.push(CollectionEntry {
            id: entry.id.clone(),
            name: entry.name.clone(),
            api_id: Some(entry.api_id.clone()),
            count,
        });
    }

    let mut unknown: Vec<&String> = counts
        .keys()
        .filter(|name| !matched.contains(name.as_str()))
        .collect();
    unknown.sort();
    for name in unknown {
        merged.push(CollectionEntry {
            id: name.clone(),
            name: Some(name.clone()),
            api_id: None,
            count: counts.get(name).copied(),
        });
    }

    merged
}

// Case-insensitive substring filter over id or name, then clamp and slice.
pub fn filter_entries(
    entries: &[CollectionEntry],
    q: Option<&str>,
    limit: usize,
) -> Vec<CollectionEntry> {
    let limit = limit.clamp(1, 200);
    let needle = q.map(str::to_lowercase).filter(|n| !n.is_empty());

    entries
        .iter()
        .filter(|entry| match &needle {
            Some(n) => {
                entry.id.to_lowercase().contains(n)
                    || entry
                        .name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(n))
            }
            None => true,
        })
        .take(limit)
        .cloned()
        .collect()
}
