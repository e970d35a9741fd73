use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Static catalog row, loaded once at startup
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub api_id: String,
}

// One row of the aggregated collections response. Entries sampled from
// listings without a catalog match carry no api_id.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CollectionEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CollectionsResponse {
    pub data: Vec<CollectionEntry>,
    pub fetched_at: DateTime<Utc>,
    pub ttl_ms: u64,
}
