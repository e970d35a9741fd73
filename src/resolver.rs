//! Collection name resolution.
//!
//! The upstream API filters listings by an internal collection id (`set_...`)
//! that is never shown to users. The resolver maps whatever the user typed
//! ("The Gamma Collection", "gamma_collection", a percent-encoded form) to
//! that id through a normalized index over the static catalog, falling back
//! to a heuristic guess when the catalog has no match. A wrong guess degrades
//! to an empty result set upstream, never to an error.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::models::CatalogEntry;

pub const CANONICAL_PREFIX: &str = "set_";

pub struct CollectionResolver {
    entries: Vec<CatalogEntry>,
    // normalized key -> api_id, read-only after startup
    index: HashMap<String, String>,
}

impl CollectionResolver {
    // Load the catalog file. Absence or bad JSON is tolerated: the resolver
    // then runs heuristic-only and the aggregator sampling-only.
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<CatalogEntry>>(&raw) {
                Ok(entries) => {
                    info!(path = %path.display(), count = entries.len(), "loaded collection catalog");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "collection catalog unreadable, resolving heuristically");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "collection catalog missing, resolving heuristically");
                Vec::new()
            }
        };
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut index = HashMap::new();
        for entry in &entries {
            // up to 4 keys per entry; on collision the last entry wins
            let id_key = normalize(&entry.id);
            index.insert(strip_affixes(&id_key), entry.api_id.clone());
            index.insert(id_key, entry.api_id.clone());
            if let Some(name) = &entry.name {
                let name_key = normalize(name);
                index.insert(strip_affixes(&name_key), entry.api_id.clone());
                index.insert(name_key, entry.api_id.clone());
            }
        }
        Self { entries, index }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    // Map raw user input to the upstream collection id. Canonical-looking
    // input passes through unchanged; anything else goes through the catalog
    // index and then the heuristic. Never fails.
    pub fn resolve(&self, raw: &str) -> String {
        if raw.starts_with(CANONICAL_PREFIX) {
            return raw.to_string();
        }
        let key = strip_affixes(&normalize(raw));
        if let Some(api_id) = self.index.get(&key) {
            return api_id.clone();
        }
        guess_api_id(raw)
    }
}

// Percent-decode, lowercase, collapse non-alphanumeric runs to a single
// underscore, trim leading/trailing underscores.
fn normalize(s: &str) -> String {
    let decoded = match urlencoding::decode(s) {
        Ok(cow) => cow.into_owned(),
        Err(_) => s.to_string(),
    };
    let lower = decoded.to_lowercase();

    let mut out = String::with_capacity(lower.len());
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

// Drop a leading "the" article and a trailing "collection" suffix token.
fn strip_affixes(key: &str) -> String {
    let mut tokens: Vec<&str> = key.split('_').filter(|t| !t.is_empty()).collect();
    if tokens.first() == Some(&"the") {
        tokens.remove(0);
    }
    if tokens.last() == Some(&"collection") {
        tokens.pop();
    }
    tokens.join("_")
}

// Best-guess id for input the catalog does not know. Encodes the upstream
// naming convention observed in the wild: lowercase words joined by
// underscores under a `set_` prefix, articles dropped, "&" spelled out.
fn guess_api_id(raw: &str) -> String {
    let lower = raw.to_lowercase().replace('&', " and ");
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty() && *t != "the" && *t != "collection")
        .collect();
    format!("{}{}", CANONICAL_PREFIX, tokens.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CollectionResolver {
        CollectionResolver::from_entries(vec![
            CatalogEntry {
                id: "gamma".to_string(),
                name: Some("The Gamma Collection".to_string()),
                api_id: "set_gamma".to_string(),
            },
            CatalogEntry {
                id: "ancient".to_string(),
                name: Some("The Ancient Collection".to_string()),
                api_id: "set_op10_ancient".to_string(),
            },
        ])
    }

    #[test]
    fn name_variants_hit_the_same_catalog_entry() {
        let r = resolver();
        assert_eq!(r.resolve("The Gamma Collection"), "set_gamma");
        assert_eq!(r.resolve("the_gamma_collection"), "set_gamma");
        assert_eq!(r.resolve("Gamma Collection"), "set_gamma");
        assert_eq!(r.resolve("gamma"), "set_gamma");
    }

    #[test]
    fn percent_encoded_input_is_decoded() {
        let r = resolver();
        assert_eq!(r.resolve("The%20Gamma%20Collection"), "set_gamma");
    }

    #[test]
    fn catalog_beats_the_heuristic_for_irregular_ids() {
        // "set_op10_ancient" is not guessable from the display name
        let r = resolver();
        assert_eq!(r.resolve("Ancient Collection"), "set_op10_ancient");
    }

    #[test]
    fn canonical_input_passes_through() {
        let r = resolver();
        assert_eq!(r.resolve("set_whatever_2"), "set_whatever_2");
    }

    #[test]
    fn unknown_names_fall_back_to_a_deterministic_guess() {
        let r = resolver();
        assert_eq!(r.resolve("Kilowatt Case"), "set_kilowatt_case");
        assert_eq!(r.resolve("Fracture & Chroma"), "set_fracture_and_chroma");
        assert_eq!(r.resolve("The Kilowatt Collection"), "set_kilowatt");
    }

    #[test]
    fn empty_catalog_still_resolves() {
        let r = CollectionResolver::from_entries(Vec::new());
        assert_eq!(r.resolve("Gamma Collection"), "set_gamma");
    }
}
