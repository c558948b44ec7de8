//! Search client trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::search::SearchResult;

/// Black-box "query in, ranked snippets out" endpoint.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Executes a web search.
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `limit` - Maximum number of results to return
    ///
    /// # Returns
    /// Results in provider relevance order, at most `limit` of them. A payload
    /// without a results list yields an empty vector; a failed request yields
    /// [`crate::QuarryError::SearchUnavailable`].
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}
