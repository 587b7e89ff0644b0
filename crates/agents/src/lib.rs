//! Agent crate for the Carebot pipeline.
//!
//! An agent is a component that, given a query, supplies grounding context
//! and provenance from one knowledge source. This crate provides:
//!
//! - [`Router`] — classifies a query into the agent that should handle it
//! - [`RetrievalAgent`] — knowledge-base lookup via embeddings + vector index
//! - [`WebSearchAgent`] — current information from trusted web domains
//!
//! All agents share the [`AgentContext`] output contract and are total:
//! provider failures degrade to fallback contexts instead of errors.

pub mod retrieval;
pub mod router;
pub mod types;
pub mod web_search;

// Re-export main types
pub use retrieval::{RetrievalAgent, DEFAULT_CONTEXT_LIMIT, DEFAULT_TOP_K, SIMILARITY_THRESHOLD};
pub use router::Router;
pub use types::{
    AgentContext, AgentLabel, DocumentInput, DocumentSource, RetrievedDocument, Sources, WebSource,
};
pub use web_search::{WebSearchAgent, DEFAULT_MAX_RESULTS, TRUSTED_DOMAINS};
