//! Pipeline orchestration.
//!
//! Sequences Router → chosen Agent → Response Generator → Safety Classifier
//! and packages the result. Every stage is total, so every non-blank request
//! reaches the end of the pipeline; the only caller-visible failure is an
//! empty message, rejected before any external call.

use crate::generator::ResponseGenerator;
use crate::safety::SafetyClassifier;
use crate::store::{ExchangeRecord, ProjectStore, SessionStore, DEFAULT_PERSONA};
use carebot_agents::{
    AgentContext, AgentLabel, DocumentInput, RetrievalAgent, Router, Sources, WebSearchAgent,
    DEFAULT_CONTEXT_LIMIT, DEFAULT_MAX_RESULTS,
};
use carebot_core::{AppError, AppResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Inbound chat query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// The user's message (required, non-blank)
    pub message: String,

    /// Project the query belongs to
    pub project_id: String,

    /// Conversation identifier; generated when absent
    #[serde(default)]
    pub session_id: Option<String>,

    /// End user, when known
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Terminal pipeline artifact returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// The generated answer
    pub response: String,

    /// Which agent supplied the context
    pub agent_used: AgentLabel,

    /// Provenance for the answer
    pub sources: Sources,

    /// Safety classifier verdict
    pub safe: bool,

    /// Project the query belonged to
    pub project_id: String,
}

/// Per-component availability report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub router: bool,
    pub retrieval: bool,
    pub web_search: bool,
    pub generation: bool,
    pub safety: bool,
}

/// The multi-agent chat pipeline.
///
/// Holds one instance of every component; requests share no mutable state,
/// so a single pipeline serves concurrent requests independently.
pub struct ChatPipeline {
    router: Router,
    retrieval: RetrievalAgent,
    web_search: WebSearchAgent,
    generator: ResponseGenerator,
    safety: SafetyClassifier,
    sessions: Arc<dyn SessionStore>,
    projects: Arc<dyn ProjectStore>,
}

impl ChatPipeline {
    /// Assemble a pipeline from its components.
    pub fn new(
        router: Router,
        retrieval: RetrievalAgent,
        web_search: WebSearchAgent,
        generator: ResponseGenerator,
        safety: SafetyClassifier,
        sessions: Arc<dyn SessionStore>,
        projects: Arc<dyn ProjectStore>,
    ) -> Self {
        Self {
            router,
            retrieval,
            web_search,
            generator,
            safety,
            sessions,
            projects,
        }
    }

    /// Run one query through the pipeline.
    ///
    /// Routing, context retrieval, generation, and safety checking each
    /// degrade to documented fallbacks on failure; the only error this
    /// method returns is a blank message.
    pub async fn handle(&self, query: Query) -> AppResult<ChatOutcome> {
        let message = query.message.trim().to_string();

        if message.is_empty() {
            return Err(AppError::Pipeline("Message cannot be empty".to_string()));
        }

        tracing::info!(
            project_id = %query.project_id,
            "Processing chat request: {:.100}",
            message
        );

        // Route, then dispatch exhaustively on the label
        let label = self.router.route(&message).await;

        let agent_context: AgentContext = match label {
            AgentLabel::Retrieval => {
                self.retrieval
                    .retrieve_context(&message, DEFAULT_CONTEXT_LIMIT)
                    .await
            }
            AgentLabel::WebSearch => {
                self.web_search
                    .search_web(&message, DEFAULT_MAX_RESULTS)
                    .await
            }
        };

        let persona = self.resolve_persona(&query.project_id).await;

        let response = self
            .generator
            .generate(&message, &agent_context.context, label, &persona)
            .await;

        let safe = self.safety.is_safe(&response).await;

        self.record_exchange(&query, &message, &response, label);

        Ok(ChatOutcome {
            response,
            agent_used: label,
            sources: agent_context.sources,
            safe,
            project_id: query.project_id,
        })
    }

    /// Search the project's curated sites directly.
    pub async fn search_curated(&self, project_id: &str, query: &str) -> AgentContext {
        let sites = match self.projects.curated_domains(project_id).await {
            Ok(sites) => sites,
            Err(e) => {
                tracing::warn!("Failed to load curated domains: {}", e);
                Vec::new()
            }
        };

        self.web_search.search_curated(query, &sites).await
    }

    /// Add documents to the knowledge base.
    ///
    /// Returns `false` when no documents were valid or the index is
    /// unavailable; never errors.
    pub async fn ingest_documents(&self, documents: &[DocumentInput]) -> bool {
        self.retrieval.add_documents(documents).await
    }

    /// Report per-component availability.
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            router: self.router.is_configured(),
            retrieval: self.retrieval.is_configured(),
            web_search: self.web_search.is_configured(),
            generation: self.generator.is_configured(),
            safety: self.safety.is_configured(),
        }
    }

    /// Project persona with the hardcoded fallback.
    async fn resolve_persona(&self, project_id: &str) -> String {
        match self.projects.persona(project_id).await {
            Ok(Some(persona)) => persona,
            Ok(None) => DEFAULT_PERSONA.to_string(),
            Err(e) => {
                tracing::warn!("Failed to load project persona: {}", e);
                DEFAULT_PERSONA.to_string()
            }
        }
    }

    /// Fire-and-forget session persistence.
    ///
    /// A store failure is logged and never retracts the computed answer.
    fn record_exchange(&self, query: &Query, message: &str, response: &str, label: AgentLabel) {
        let record = ExchangeRecord {
            project_id: query.project_id.clone(),
            session_id: query
                .session_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: query.user_id.clone(),
            user_text: message.to_string(),
            assistant_text: response.to_string(),
            agent_label: label,
            timestamp: Utc::now(),
        };

        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            if let Err(e) = sessions.append_exchange(&record).await {
                tracing::warn!("Failed to persist exchange: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GENERATION_FALLBACK;
    use carebot_core::AppResult;
    use carebot_providers::{
        ChatClient, ChatRequest, ChatResponse, EmbeddingClient, SearchRequest, SearchResult,
        VectorIndexClient, VectorMatch, VectorRecord, WebSearchClient,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Chat double with a canned reply and a call counter.
    struct CountingChat {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingChat {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ChatClient for CountingChat {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(reply) => Ok(ChatResponse {
                    content: reply.clone(),
                    model: "stub".to_string(),
                }),
                None => Err(AppError::Provider("chat down".to_string())),
            }
        }
    }

    struct CountingEmbeddings {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EmbeddingClient for CountingEmbeddings {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![0.0; 3]).collect())
        }
    }

    struct StubIndex {
        matches: Vec<VectorMatch>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl VectorIndexClient for StubIndex {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn upsert(&self, _records: &[VectorRecord]) -> AppResult<()> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
            _include_metadata: bool,
        ) -> AppResult<Vec<VectorMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.matches.clone())
        }
    }

    struct FailingSearch {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl WebSearchClient for FailingSearch {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn search(&self, _request: &SearchRequest) -> AppResult<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Provider("search down".to_string()))
        }
    }

    /// Session store double forwarding records over a channel.
    struct ChannelSessions {
        tx: tokio::sync::mpsc::UnboundedSender<ExchangeRecord>,
    }

    #[async_trait::async_trait]
    impl SessionStore for ChannelSessions {
        async fn append_exchange(&self, record: &ExchangeRecord) -> AppResult<()> {
            self.tx
                .send(record.clone())
                .map_err(|e| AppError::Other(e.to_string()))
        }
    }

    struct StaticProjects {
        persona: Option<String>,
        domains: Vec<String>,
    }

    #[async_trait::async_trait]
    impl ProjectStore for StaticProjects {
        async fn persona(&self, _project_id: &str) -> AppResult<Option<String>> {
            Ok(self.persona.clone())
        }

        async fn curated_domains(&self, _project_id: &str) -> AppResult<Vec<String>> {
            Ok(self.domains.clone())
        }
    }

    fn doc_match(text: &str, score: f32) -> VectorMatch {
        let mut metadata = serde_json::Map::new();
        metadata.insert("text".to_string(), json!(text));
        VectorMatch { score, metadata }
    }

    fn query(message: &str) -> Query {
        Query {
            message: message.to_string(),
            project_id: "proj-1".to_string(),
            session_id: Some("sess-1".to_string()),
            user_id: None,
        }
    }

    struct Fixture {
        pipeline: ChatPipeline,
        router_chat: Arc<CountingChat>,
        embeddings: Arc<CountingEmbeddings>,
        index: Arc<StubIndex>,
        search: Arc<FailingSearch>,
        exchanges: tokio::sync::mpsc::UnboundedReceiver<ExchangeRecord>,
    }

    /// Build a pipeline where the router replies `route_reply`, the index
    /// returns `matches`, generation replies with a fixed answer, and the
    /// web search provider always fails.
    fn fixture(route_reply: Option<&str>, matches: Vec<VectorMatch>) -> Fixture {
        let router_chat = match route_reply {
            Some(reply) => CountingChat::replying(reply),
            None => CountingChat::failing(),
        };
        let embeddings = Arc::new(CountingEmbeddings {
            calls: AtomicUsize::new(0),
        });
        let index = Arc::new(StubIndex {
            matches,
            calls: AtomicUsize::new(0),
        });
        let search = Arc::new(FailingSearch {
            calls: AtomicUsize::new(0),
        });

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        let pipeline = ChatPipeline::new(
            Router::new(router_chat.clone(), "m"),
            RetrievalAgent::new(embeddings.clone(), index.clone()),
            WebSearchAgent::new(search.clone()),
            ResponseGenerator::new(CountingChat::replying("Generated answer."), "m"),
            SafetyClassifier::new(CountingChat::replying("SAFE - fine"), "m"),
            Arc::new(ChannelSessions { tx }),
            Arc::new(StaticProjects {
                persona: None,
                domains: vec!["mayoclinic.org".to_string()],
            }),
        );

        Fixture {
            pipeline,
            router_chat,
            embeddings,
            index,
            search,
            exchanges: rx,
        }
    }

    #[tokio::test]
    async fn test_retrieval_flow_end_to_end() {
        let mut fx = fixture(
            Some("RAG_Agent"),
            vec![doc_match("Flu symptoms include fever.", 0.85), doc_match("Rest and fluids help.", 0.72)],
        );

        let outcome = fx
            .pipeline
            .handle(query("What are the symptoms of flu?"))
            .await
            .unwrap();

        assert_eq!(outcome.agent_used, AgentLabel::Retrieval);
        assert_eq!(outcome.response, "Generated answer.");
        assert!(outcome.safe);
        assert_eq!(outcome.project_id, "proj-1");

        match outcome.sources {
            Sources::KnowledgeBase { count, documents } => {
                assert_eq!(count, 2);
                assert_eq!(documents.len(), 2);
            }
            other => panic!("expected knowledge_base sources, got {:?}", other),
        }

        // The exchange is persisted asynchronously
        let record = fx.exchanges.recv().await.unwrap();
        assert_eq!(record.session_id, "sess-1");
        assert_eq!(record.assistant_text, "Generated answer.");
        assert_eq!(record.agent_label, AgentLabel::Retrieval);
    }

    #[tokio::test]
    async fn test_blank_message_rejected_before_any_external_call() {
        let fx = fixture(Some("RAG_Agent"), Vec::new());

        for message in ["", "   ", "\n\t"] {
            let result = fx.pipeline.handle(query(message)).await;
            assert!(matches!(result, Err(AppError::Pipeline(_))));
        }

        assert_eq!(fx.router_chat.calls(), 0);
        assert_eq!(fx.embeddings.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.index.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_web_search_failure_still_reaches_done() {
        let fx = fixture(Some("WebSearch_Agent"), Vec::new());

        let outcome = fx
            .pipeline
            .handle(query("latest drug recalls"))
            .await
            .unwrap();

        assert_eq!(outcome.agent_used, AgentLabel::WebSearch);
        assert!(matches!(outcome.sources, Sources::Error { .. }));
        assert_eq!(outcome.response, "Generated answer.");
        assert_eq!(fx.search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_stage_failing_degrades_to_fallbacks() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let pipeline = ChatPipeline::new(
            Router::new(CountingChat::failing(), "m"),
            RetrievalAgent::new(
                Arc::new(CountingEmbeddings {
                    calls: AtomicUsize::new(0),
                }),
                Arc::new(StubIndex {
                    matches: Vec::new(),
                    calls: AtomicUsize::new(0),
                }),
            ),
            WebSearchAgent::new(Arc::new(FailingSearch {
                calls: AtomicUsize::new(0),
            })),
            ResponseGenerator::new(CountingChat::failing(), "m"),
            SafetyClassifier::new(CountingChat::failing(), "m"),
            Arc::new(ChannelSessions { tx }),
            Arc::new(StaticProjects {
                persona: None,
                domains: Vec::new(),
            }),
        );

        let outcome = pipeline.handle(query("anything at all")).await.unwrap();

        // Router failure → default label, generation failure → apology,
        // safety failure → fail-open
        assert_eq!(outcome.agent_used, AgentLabel::DEFAULT);
        assert_eq!(outcome.response, GENERATION_FALLBACK);
        assert!(outcome.safe);
    }

    #[tokio::test]
    async fn test_router_garbage_defaults_to_retrieval() {
        let fx = fixture(Some("definitely not a label"), Vec::new());

        let outcome = fx.pipeline.handle(query("hello")).await.unwrap();
        assert_eq!(outcome.agent_used, AgentLabel::DEFAULT);
        // The default label dispatched to retrieval, not web search
        assert_eq!(fx.search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.index.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_id_generated_when_absent() {
        let mut fx = fixture(Some("RAG_Agent"), Vec::new());

        let mut q = query("hello");
        q.session_id = None;
        fx.pipeline.handle(q).await.unwrap();

        let record = fx.exchanges.recv().await.unwrap();
        assert!(!record.session_id.is_empty());
    }

    #[tokio::test]
    async fn test_curated_search_uses_project_domains() {
        let fx = fixture(Some("RAG_Agent"), Vec::new());

        // The stub search client fails, so the curated path degrades
        let ctx = fx.pipeline.search_curated("proj-1", "measles").await;
        assert!(!ctx.success);
        assert_eq!(fx.search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_status_reports_configured_components() {
        let fx = fixture(Some("RAG_Agent"), Vec::new());
        let status = fx.pipeline.status();
        assert!(status.router);
        assert!(status.retrieval);
        assert!(status.web_search);
        assert!(status.generation);
        assert!(status.safety);
    }
}
