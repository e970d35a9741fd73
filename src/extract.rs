//! Tolerant extraction of upstream response shapes.
//!
//! The upstream has shipped listing pages as a bare array, as `{"data": [...]}`,
//! and as objects keyed by other names. The strategies below are tried in
//! order, first match wins; an unrecognized shape yields an empty page rather
//! than an error. New shapes get a new entry here, callers stay untouched.

use axum::http::HeaderMap;
use serde_json::Value;

const ITEM_FIELDS: [&str; 3] = ["listings", "items", "results"];

// Pagination cursor header candidates, checked in order (first non-empty wins).
const CURSOR_HEADERS: [&str; 3] = ["x-next-cursor", "next-cursor", "x_next_cursor"];

pub fn extract_items(body: &Value) -> &[Value] {
    if let Some(arr) = body.as_array() {
        return arr;
    }
    if let Some(arr) = body.get("data").and_then(Value::as_array) {
        return arr;
    }
    for field in ITEM_FIELDS {
        if let Some(arr) = body.get(field).and_then(Value::as_array) {
            return arr;
        }
    }
    if let Some(data) = body.get("data") {
        for field in ITEM_FIELDS {
            if let Some(arr) = data.get(field).and_then(Value::as_array) {
                return arr;
            }
        }
    }
    &[]
}

pub fn next_cursor(headers: &HeaderMap) -> Option<String> {
    for name in CURSOR_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn bare_array_is_the_page() {
        let body = json!([{"id": "b"}]);
        assert_eq!(extract_items(&body), [json!({"id": "b"})]);
    }

    #[test]
    fn data_array_field_wins_over_other_fields() {
        let body = json!({"data": [{"id": "a"}], "listings": [{"id": "x"}]});
        assert_eq!(extract_items(&body), [json!({"id": "a"})]);
    }

    #[test]
    fn known_field_names_are_tried_in_order() {
        let body = json!({"listings": [{"id": "a"}]});
        assert_eq!(extract_items(&body), [json!({"id": "a"})]);

        let nested = json!({"data": {"items": [{"id": "c"}]}});
        assert_eq!(extract_items(&nested), [json!({"id": "c"})]);
    }

    #[test]
    fn unrecognized_shapes_yield_an_empty_page() {
        assert!(extract_items(&json!({"foo": 1})).is_empty());
        assert!(extract_items(&json!("nope")).is_empty());
        assert!(extract_items(&Value::Null).is_empty());
    }

    #[test]
    fn first_non_empty_cursor_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-next-cursor", HeaderValue::from_static(""));
        headers.insert("next-cursor", HeaderValue::from_static("abc"));
        assert_eq!(next_cursor(&headers), Some("abc".to_string()));

        assert_eq!(next_cursor(&HeaderMap::new()), None);
    }
}
