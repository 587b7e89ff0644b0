//! Query router.
//!
//! Classifies a raw user query into the agent that should supply context.
//! Routing is total: any provider failure or unrecognized classification
//! degrades to `AgentLabel::DEFAULT` rather than surfacing an error.

use crate::types::AgentLabel;
use carebot_providers::{ChatClient, ChatRequest};
use std::sync::Arc;

/// Sampling temperature for routing calls; low to bias toward a single
/// deterministic label token.
const ROUTING_TEMPERATURE: f32 = 0.1;

/// Output cap for routing calls; the answer is one label.
const ROUTING_MAX_TOKENS: u32 = 50;

/// Routes incoming queries to the most appropriate agent.
pub struct Router {
    /// Chat client; `None` when credentials were absent at construction
    chat: Option<Arc<dyn ChatClient>>,

    /// Model used for classification
    model: String,
}

impl Router {
    /// Create a router backed by the given chat client.
    pub fn new(chat: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            chat: Some(chat),
            model: model.into(),
        }
    }

    /// Create a disabled router that always answers the default label.
    pub fn disabled() -> Self {
        Self {
            chat: None,
            model: String::new(),
        }
    }

    /// Whether a chat client is wired in.
    pub fn is_configured(&self) -> bool {
        self.chat.is_some()
    }

    /// Analyze the query and decide which agent should handle it.
    ///
    /// Never fails: classification errors, timeouts, and unrecognized
    /// label text all resolve to `AgentLabel::DEFAULT`.
    pub async fn route(&self, query: &str) -> AgentLabel {
        let Some(chat) = &self.chat else {
            return AgentLabel::DEFAULT;
        };

        let request = ChatRequest::new(&self.model, build_routing_prompt(query))
            .with_temperature(ROUTING_TEMPERATURE)
            .with_max_tokens(ROUTING_MAX_TOKENS);

        match chat.complete(&request).await {
            Ok(response) => {
                let decision = response.content.trim();
                match AgentLabel::parse(decision) {
                    Some(label) => {
                        tracing::info!(label = %label, "Router decision");
                        label
                    }
                    None => {
                        tracing::warn!(
                            decision,
                            "Invalid agent decision, defaulting to {}",
                            AgentLabel::DEFAULT
                        );
                        AgentLabel::DEFAULT
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Routing failed: {}, defaulting to {}", e, AgentLabel::DEFAULT);
                AgentLabel::DEFAULT
            }
        }
    }
}

/// Build the fixed classification prompt embedding the query and the valid
/// label set with one-line usage guidance per label.
fn build_routing_prompt(query: &str) -> String {
    format!(
        r#"Analyze this medical query and determine which specialized agent should handle it.

Query: "{query}"

Available agents:
1. RAG_Agent - For questions about medical conditions, symptoms, treatments, general health information, appointment-related queries, and facility information
2. WebSearch_Agent - For current medical news, latest research, drug recalls, recent health updates, breaking health news

Rules:
- Choose RAG_Agent for general medical knowledge questions, appointment inquiries, hospital/clinic information
- Choose WebSearch_Agent ONLY for current/recent medical information that requires up-to-date search results
- When in doubt, choose RAG_Agent

Respond with only the agent name (e.g., "RAG_Agent")."#
    )
}
