//! Tavily web search provider.

use crate::search::{SearchDepth, SearchRequest, SearchResult, WebSearchClient};
use carebot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include_domains: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Tavily web search client.
pub struct TavilyClient {
    /// API key (sent in the request body per Tavily's contract)
    api_key: String,

    /// Search endpoint URL
    endpoint: String,

    /// HTTP client with explicit timeout
    client: reqwest::Client,
}

impl TavilyClient {
    /// Create a new Tavily client.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            client,
        })
    }

    /// Override the search endpoint (used in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn depth_str(depth: SearchDepth) -> &'static str {
        match depth {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

#[async_trait::async_trait]
impl WebSearchClient for TavilyClient {
    fn provider_name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchResult>> {
        tracing::debug!(
            max_results = request.max_results,
            domains = request.include_domains.len(),
            "Executing web search"
        );

        let tavily_request = TavilyRequest {
            api_key: &self.api_key,
            query: &request.query,
            search_depth: Self::depth_str(request.depth),
            max_results: request.max_results,
            include_domains: request.include_domains.clone(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&tavily_request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Web search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Web search API error ({}): {}",
                status, error_text
            )));
        }

        let tavily_response: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse search response: {}", e)))?;

        Ok(tavily_response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_serialization() {
        assert_eq!(TavilyClient::depth_str(SearchDepth::Advanced), "advanced");
        assert_eq!(TavilyClient::depth_str(SearchDepth::Basic), "basic");
    }

    #[test]
    fn test_response_defaults_to_empty_results() {
        let parsed: TavilyResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_empty_domain_list_is_omitted_from_payload() {
        let request = TavilyRequest {
            api_key: "key",
            query: "flu",
            search_depth: "advanced",
            max_results: 5,
            include_domains: Vec::new(),
        };
        let payload = serde_json::to_value(&request).unwrap();
        assert!(payload.get("include_domains").is_none());
    }
}
