use std::time::Duration;

use reqwest::{Response, StatusCode, header};
use tracing::debug;

use crate::metrics::UPSTREAM_RETRIES;

// Delay schedule per retry index; a reply's Retry-After can only lengthen it.
const BACKOFF_MS: [u64; 4] = [500, 1000, 2000, 4000];

// HTTP client for the upstream market API. Retries 429/5xx with backoff,
// returns everything else as-is. Connection-level errors are not retried.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    backoff_ms: [u64; 4],
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            backoff_ms: BACKOFF_MS,
        }
    }

    // Override the delay schedule; tests zero it to exercise the retry loop
    // without sleeping.
    pub fn with_backoff(mut self, backoff_ms: [u64; 4]) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0usize;

        loop {
            let mut req = self.http.get(&url).header(header::ACCEPT, "application/json");
            if let Some(key) = &self.api_key {
                req = req.header(header::AUTHORIZATION, key);
            }
            if !query.is_empty() {
                req = req.query(query);
            }

            let res = req.send().await?;
            let status = res.status();
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            // Final attempt returns whatever the upstream said, retryable or not.
            if !retryable || attempt >= self.backoff_ms.len() {
                return Ok(res);
            }

            let delay_ms = self.backoff_ms[attempt].max(retry_after_ms(&res).unwrap_or(0));
            UPSTREAM_RETRIES.inc();
            debug!(status = status.as_u16(), attempt, delay_ms, path, "retrying upstream request");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            attempt += 1;
        }
    }
}

fn retry_after_ms(res: &Response) -> Option<u64> {
    res.headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}
