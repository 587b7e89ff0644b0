//! Shared agent types.
//!
//! `AgentContext` is the uniform contract between the agents and the
//! orchestrator: whichever agent runs, the orchestrator receives the same
//! shape back and never needs to special-case the knowledge source.

use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Which downstream agent should handle a query.
///
/// A closed enum rather than raw strings: adding or removing a label is a
/// compile-time-checked change at every dispatch point. Wire names keep the
/// historical `RAG_Agent` / `WebSearch_Agent` spelling for output
/// compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentLabel {
    /// Knowledge-base retrieval (RAG)
    #[serde(rename = "RAG_Agent")]
    Retrieval,

    /// Current-information web search
    #[serde(rename = "WebSearch_Agent")]
    WebSearch,
}

impl AgentLabel {
    /// Fail-safe default used whenever classification is ambiguous,
    /// invalid, or unavailable. The same constant everywhere.
    pub const DEFAULT: AgentLabel = AgentLabel::Retrieval;

    /// Wire name of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentLabel::Retrieval => "RAG_Agent",
            AgentLabel::WebSearch => "WebSearch_Agent",
        }
    }

    /// Parse a wire name. Exact, case-sensitive match only.
    pub fn parse(s: &str) -> Option<AgentLabel> {
        match s {
            "RAG_Agent" => Some(AgentLabel::Retrieval),
            "WebSearch_Agent" => Some(AgentLabel::WebSearch),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured provenance returned alongside an agent's context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sources {
    /// Documents retrieved from the knowledge base
    KnowledgeBase {
        count: usize,
        documents: Vec<DocumentSource>,
    },

    /// Web search results
    Web { results: Vec<WebSource> },

    /// No external context; the model answers from general knowledge
    General { description: String },

    /// A degraded path was taken; description says why
    Error { description: String },
}

/// Provenance record for one retrieved knowledge-base document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Preview of the document text (truncated with an ellipsis)
    pub text: String,

    /// Similarity score from the vector index
    pub score: f32,

    /// Metadata stored with the document
    pub metadata: Map<String, serde_json::Value>,
}

/// Provenance record for one web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSource {
    /// Page title
    pub title: String,

    /// Page URL
    pub url: String,

    /// Result content (previewed for general search, full for curated)
    pub content: String,

    /// Host of the source site (curated search only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

/// Common output shape shared by all agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContext {
    /// Bounded text assembled from the knowledge source
    pub context: String,

    /// Where the context came from
    pub sources: Sources,

    /// Whether the agent ran as intended (a degraded path sets false;
    /// an empty result set does not)
    pub success: bool,

    /// Human-readable status
    pub message: String,
}

/// A document surviving the retrieval agent's similarity filter.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    /// Document text (from index metadata)
    pub text: String,

    /// Similarity score in (0.7, 1.0]
    pub score: f32,

    /// Metadata stored with the vector
    pub metadata: Map<String, serde_json::Value>,
}

/// A document submitted for ingestion into the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Full document text
    pub text: String,

    /// Arbitrary metadata to store alongside the vector
    #[serde(default)]
    pub metadata: Map<String, serde_json::Value>,
}

/// Truncate text to a character budget, appending an ellipsis when cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
