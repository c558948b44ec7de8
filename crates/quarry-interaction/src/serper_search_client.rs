//! Web search client for Serper's Google search endpoint.
//!
//! Sends `{ "q", "num" }` and reads the `organic` array. A response without
//! that array is treated as "no results", not as a failure, so the pipeline
//! keeps moving with whatever context it has.

use std::time::Duration;

use async_trait::async_trait;
use quarry_core::config::{Credentials, DEFAULT_SEARCH_BASE_URL, PipelineConfig};
use quarry_core::{QuarryError, Result, SearchClient, SearchResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Search client backed by the Serper API.
#[derive(Clone)]
pub struct SerperSearchClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerperSearchClient {
    /// Creates a new client using the provided API key and default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_http_client(DEFAULT_TIMEOUT_SECS)?,
            api_key: api_key.into(),
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
        })
    }

    /// Builds a client from resolved credentials and pipeline settings.
    pub fn from_config(credentials: &Credentials, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.search_timeout_secs)?,
            api_key: credentials.search_api_key.clone(),
            base_url: config.search_base_url.clone(),
        })
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }

    async fn perform_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let request = SearchRequest { q: query, num: limit };

        let response = self
            .client
            .post(self.endpoint())
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                QuarryError::search_unavailable(format!("Search request failed: {err}"), None)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read search error body".to_string());
            return Err(QuarryError::search_unavailable(
                format!("Search API returned HTTP {}: {}", status.as_u16(), body),
                Some(status.as_u16()),
            ));
        }

        let payload: Value = response.json().await.map_err(|err| {
            QuarryError::search_unavailable(format!("Failed to parse search response: {err}"), None)
        })?;

        Ok(extract_organic_results(&payload, limit))
    }
}

#[async_trait]
impl SearchClient for SerperSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(QuarryError::invalid_input("Search query cannot be empty"));
        }

        let results = self.perform_search(trimmed, limit).await?;
        tracing::debug!(
            query = trimmed,
            results = results.len(),
            "[SerperSearchClient] Search completed"
        );
        Ok(results)
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|err| {
            QuarryError::configuration(format!("Failed to build search HTTP client: {err}"))
        })
}

/// Reads `organic[]` entries, defaulting missing string fields to `""`.
///
/// Returns an empty list when the field is absent or not an array.
pub(crate) fn extract_organic_results(root: &Value, limit: usize) -> Vec<SearchResult> {
    let Some(entries) = root.get("organic").and_then(|v| v.as_array()) else {
        tracing::warn!("[SerperSearchClient] Response has no organic results field");
        return Vec::new();
    };

    let field = |entry: &Value, name: &str| {
        entry
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .take(limit)
        .map(|entry| SearchResult {
            title: field(entry, "title"),
            link: field(entry, "link"),
            snippet: field(entry, "snippet"),
        })
        .collect()
}
