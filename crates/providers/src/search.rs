//! Web search client abstraction.

use carebot_core::AppResult;
use serde::{Deserialize, Serialize};

/// Search depth requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// Web search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub query: String,

    /// Requested search depth
    pub depth: SearchDepth,

    /// Maximum number of results
    pub max_results: usize,

    /// Restrict results to these domains
    pub include_domains: Vec<String>,
}

impl SearchRequest {
    /// Create an advanced-depth request restricted to the given domains.
    pub fn advanced(
        query: impl Into<String>,
        max_results: usize,
        include_domains: Vec<String>,
    ) -> Self {
        Self {
            query: query.into(),
            depth: SearchDepth::Advanced,
            max_results,
            include_domains,
        }
    }
}

/// A single web search result, in provider order (not re-ranked locally).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title
    #[serde(default)]
    pub title: String,

    /// Page URL
    #[serde(default)]
    pub url: String,

    /// Extracted page content
    #[serde(default)]
    pub content: String,
}

/// Trait for web search providers.
#[async_trait::async_trait]
pub trait WebSearchClient: Send + Sync {
    /// Get the provider name (e.g., "tavily").
    fn provider_name(&self) -> &str;

    /// Execute a search, returning results in provider order.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchResult>>;
}
