//! Web search agent.
//!
//! Consults an external search provider for current medical information,
//! restricted to a trusted domain allow-list (or a caller-supplied one for
//! curated search). Like retrieval, every failure degrades to a usable
//! `AgentContext`.

use crate::types::{preview, AgentContext, Sources, WebSource};
use carebot_providers::{SearchRequest, WebSearchClient};
use std::sync::Arc;

/// Default number of results requested from the provider.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Qualifier prepended to raw queries to keep results in the medical domain.
const MEDICAL_QUALIFIER: &str = "medical health";

/// Character cap for content previews in general-search provenance.
const CONTENT_PREVIEW_CHARS: usize = 300;

/// Character cap for provider error text carried in the status message.
const ERROR_DISPLAY_CHARS: usize = 200;

/// Trusted medical domains for general web search.
pub const TRUSTED_DOMAINS: [&str; 8] = [
    "mayoclinic.org",
    "webmd.com",
    "healthline.com",
    "medlineplus.gov",
    "who.int",
    "cdc.gov",
    "nih.gov",
    "pubmed.ncbi.nlm.nih.gov",
];

/// Agent that searches the web for current medical information.
pub struct WebSearchAgent {
    /// Search client; `None` when credentials were absent at construction
    client: Option<Arc<dyn WebSearchClient>>,
}

impl WebSearchAgent {
    /// Create a web search agent backed by the given client.
    pub fn new(client: Arc<dyn WebSearchClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Create a disabled agent that reports the service as unavailable.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// Whether a search client is wired in.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Search the web for current medical information.
    ///
    /// Restricted to [`TRUSTED_DOMAINS`]; the raw query is prefixed with a
    /// medical qualifier. Zero results is not a failure. Total: provider
    /// errors become a `success = false` context, never an `Err`.
    pub async fn search_web(&self, query: &str, max_results: usize) -> AgentContext {
        let Some(client) = &self.client else {
            return AgentContext {
                context: "Web search temporarily unavailable. Please check back later."
                    .to_string(),
                sources: Sources::Error {
                    description: "Web search service not configured".to_string(),
                },
                success: false,
                message: "Web search service not configured".to_string(),
            };
        };

        let request = SearchRequest::advanced(
            format!("{} {}", MEDICAL_QUALIFIER, query),
            max_results,
            TRUSTED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        );

        let results = match client.search(&request).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Web search failed: {}", e);
                return AgentContext {
                    context: "Web search encountered an error. Please try again later."
                        .to_string(),
                    sources: Sources::Error {
                        description: "Web search provider failed".to_string(),
                    },
                    success: false,
                    message: format!(
                        "Web search error: {}",
                        preview(&e.to_string(), ERROR_DISPLAY_CHARS)
                    ),
                };
            }
        };

        if results.is_empty() {
            return AgentContext {
                context: "No current web information found for this query.".to_string(),
                sources: Sources::Web {
                    results: Vec::new(),
                },
                success: true,
                message: "No relevant web results found".to_string(),
            };
        }

        let mut context_parts = Vec::new();
        let mut sources = Vec::new();

        for result in results.iter().take(max_results) {
            if result.content.is_empty() {
                continue;
            }

            context_parts.push(format!("**{}**\n{}", result.title, result.content));
            sources.push(WebSource {
                title: result.title.clone(),
                url: result.url.clone(),
                content: preview(&result.content, CONTENT_PREVIEW_CHARS),
                site: None,
            });
        }

        tracing::info!(
            count = sources.len(),
            "Found web sources for query: {}",
            preview(query, 50)
        );

        let count = sources.len();

        AgentContext {
            context: context_parts.join("\n\n"),
            sources: Sources::Web { results: sources },
            success: true,
            message: format!("Found {} current web sources", count),
        }
    }

    /// Search a caller-supplied list of curated sites.
    ///
    /// Unlike [`search_web`](Self::search_web), the raw query goes up
    /// unqualified, context blocks are annotated with the source URL, and
    /// provenance carries full content plus the site host.
    pub async fn search_curated(&self, query: &str, sites: &[String]) -> AgentContext {
        let Some(client) = &self.client else {
            return AgentContext {
                context: "Curated search temporarily unavailable.".to_string(),
                sources: Sources::Error {
                    description: "Search service not configured".to_string(),
                },
                success: false,
                message: "Search service not configured".to_string(),
            };
        };

        let request = SearchRequest::advanced(query, DEFAULT_MAX_RESULTS, sites.to_vec());

        let results = match client.search(&request).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Curated search failed: {}", e);
                return AgentContext {
                    context: "Error searching curated medical websites.".to_string(),
                    sources: Sources::Error {
                        description: "Curated search provider failed".to_string(),
                    },
                    success: false,
                    message: format!(
                        "Curated search error: {}",
                        preview(&e.to_string(), ERROR_DISPLAY_CHARS)
                    ),
                };
            }
        };

        if results.is_empty() {
            return AgentContext {
                context: "No information found on the specified medical websites.".to_string(),
                sources: Sources::Web {
                    results: Vec::new(),
                },
                success: true,
                message: "No results from curated sites".to_string(),
            };
        }

        let mut context_parts = Vec::new();
        let mut sources = Vec::new();

        for result in &results {
            if result.content.is_empty() {
                continue;
            }

            context_parts.push(format!(
                "**{}** (from {})\n{}",
                result.title, result.url, result.content
            ));
            sources.push(WebSource {
                title: result.title.clone(),
                url: result.url.clone(),
                content: result.content.clone(),
                site: site_host(&result.url),
            });
        }

        let count = sources.len();

        AgentContext {
            context: context_parts.join("\n\n"),
            sources: Sources::Web { results: sources },
            success: true,
            message: format!("Found {} results from curated sites", count),
        }
    }
}

/// Extract the host component of a URL, if one is present.
fn site_host(url: &str) -> Option<String> {
    url.split('/').nth(2).map(|host| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_core::{AppError, AppResult};
    use carebot_providers::SearchResult;
    use std::sync::Mutex;

    /// Search double returning canned results and recording requests.
    struct StubSearch {
        results: Vec<SearchResult>,
        fail: bool,
        requests: Mutex<Vec<SearchRequest>>,
    }

    impl StubSearch {
        fn with_results(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                results: Vec::new(),
                fail: true,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl WebSearchClient for StubSearch {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchResult>> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(AppError::Provider("search provider exploded".to_string()));
            }
            Ok(self.results.clone())
        }
    }

    fn result(title: &str, url: &str, content: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_web_formats_context_and_sources() {
        let stub = Arc::new(StubSearch::with_results(vec![
            result("Flu Guide", "https://cdc.gov/flu", "Influenza overview."),
            result("No Content", "https://nih.gov/x", ""),
        ]));
        let agent = WebSearchAgent::new(stub.clone());

        let ctx = agent.search_web("flu", DEFAULT_MAX_RESULTS).await;
        assert!(ctx.success);
        assert!(ctx.context.contains("**Flu Guide**"));
        assert!(!ctx.context.contains("No Content"));

        match ctx.sources {
            Sources::Web { results } => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].url, "https://cdc.gov/flu");
                assert!(results[0].site.is_none());
            }
            other => panic!("expected web sources, got {:?}", other),
        }

        // The provider saw the qualified query and the trusted allow-list
        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests[0].query, "medical health flu");
        assert_eq!(requests[0].include_domains.len(), TRUSTED_DOMAINS.len());
    }

    #[tokio::test]
    async fn test_search_web_is_idempotent() {
        let stub = Arc::new(StubSearch::with_results(vec![result(
            "Title",
            "https://who.int/a",
            "Body",
        )]));
        let agent = WebSearchAgent::new(stub);

        let first = agent.search_web("query", 5).await;
        let second = agent.search_web("query", 5).await;

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_search_web_zero_results_is_success() {
        let agent = WebSearchAgent::new(Arc::new(StubSearch::with_results(Vec::new())));

        let ctx = agent.search_web("obscure", 5).await;
        assert!(ctx.success);
        assert_eq!(ctx.message, "No relevant web results found");
    }

    #[tokio::test]
    async fn test_search_web_provider_failure_degrades() {
        let agent = WebSearchAgent::new(Arc::new(StubSearch::failing()));

        let ctx = agent.search_web("query", 5).await;
        assert!(!ctx.success);
        assert!(ctx.message.contains("search provider exploded"));
        assert!(matches!(ctx.sources, Sources::Error { .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_agent_reports_unavailable_without_calls() {
        let agent = WebSearchAgent::disabled();
        assert!(!agent.is_configured());

        let ctx = agent.search_web("query", 5).await;
        assert!(!ctx.success);
        assert_eq!(ctx.message, "Web search service not configured");
    }

    #[tokio::test]
    async fn test_curated_search_annotates_url_and_site() {
        let stub = Arc::new(StubSearch::with_results(vec![result(
            "Measles",
            "https://mayoclinic.org/measles",
            "Full article content here.",
        )]));
        let agent = WebSearchAgent::new(stub.clone());

        let sites = vec!["mayoclinic.org".to_string()];
        let ctx = agent.search_curated("measles", &sites).await;

        assert!(ctx.success);
        assert!(ctx
            .context
            .contains("**Measles** (from https://mayoclinic.org/measles)"));

        match ctx.sources {
            Sources::Web { results } => {
                assert_eq!(results[0].site.as_deref(), Some("mayoclinic.org"));
                // Curated search keeps full content, no preview cap
                assert_eq!(results[0].content, "Full article content here.");
            }
            other => panic!("expected web sources, got {:?}", other),
        }

        // Raw query, caller's domain list
        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests[0].query, "measles");
        assert_eq!(requests[0].include_domains, sites);
    }

    #[test]
    fn test_site_host_extraction() {
        assert_eq!(
            site_host("https://cdc.gov/flu/index.html").as_deref(),
            Some("cdc.gov")
        );
        assert_eq!(site_host("not-a-url"), None);
    }
}
