//! Final response generation.
//!
//! Combines the project persona, the chosen agent's context, and the raw
//! user query into one chat completion. Total: a provider failure yields a
//! fixed, user-safe apology instead of an error.

use carebot_agents::AgentLabel;
use carebot_providers::{ChatClient, ChatRequest};
use std::sync::Arc;

/// Sampling temperature for answer generation.
const GENERATION_TEMPERATURE: f32 = 0.7;

/// Output token cap for answer generation.
const GENERATION_MAX_TOKENS: u32 = 1500;

/// Answer returned when generation itself fails.
pub const GENERATION_FALLBACK: &str = "I apologize, but I'm having trouble generating a response \
right now. Please try again or consult a healthcare professional for medical advice.";

/// Generates the final natural-language answer.
pub struct ResponseGenerator {
    /// Chat client; `None` when credentials were absent at construction
    chat: Option<Arc<dyn ChatClient>>,

    /// Model used for generation
    model: String,
}

impl ResponseGenerator {
    /// Create a generator backed by the given chat client.
    pub fn new(chat: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            chat: Some(chat),
            model: model.into(),
        }
    }

    /// Create a disabled generator that always answers the fallback.
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

    /// Generate the final answer for a query given agent context.
    ///
    /// The system prompt is the persona plus a section disclosing which
    /// agent produced the context; the user turn is the raw query.
    pub async fn generate(
        &self,
        query: &str,
        context: &str,
        agent_label: AgentLabel,
        persona: &str,
    ) -> String {
        let Some(chat) = &self.chat else {
            return GENERATION_FALLBACK.to_string();
        };

        let system_prompt = build_system_prompt(persona, context, agent_label);

        let request = ChatRequest::new(&self.model, query)
            .with_system(system_prompt)
            .with_temperature(GENERATION_TEMPERATURE)
            .with_max_tokens(GENERATION_MAX_TOKENS);

        match chat.complete(&request).await {
            Ok(response) => response.content.trim().to_string(),
            Err(e) => {
                tracing::error!("Error generating response: {}", e);
                GENERATION_FALLBACK.to_string()
            }
        }
    }
}

/// Build the generation system prompt: persona, context disclosure, and the
/// fixed guideline block.
fn build_system_prompt(persona: &str, context: &str, agent_label: AgentLabel) -> String {
    format!(
        "{persona}\n\n\
        Use the provided context to answer the user's question accurately and safely.\n\n\
        Context from {agent_label}:\n\
        {context}\n\n\
        Guidelines:\n\
        - Provide accurate medical information based on the context\n\
        - Always include appropriate medical disclaimers\n\
        - Suggest consulting healthcare professionals for serious concerns\n\
        - Be empathetic and supportive\n\
        - If context is insufficient, acknowledge limitations\n\n\
        Remember: You are providing general medical information, not personal medical advice."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_core::{AppError, AppResult};
    use carebot_providers::ChatResponse;
    use std::sync::Mutex;

    struct StubChat {
        reply: Option<String>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait::async_trait]
    impl ChatClient for StubChat {
        fn provider_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Some(reply) => Ok(ChatResponse {
                    content: reply.clone(),
                    model: "stub".to_string(),
                }),
                None => Err(AppError::Provider("llm down".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_trims_and_returns_content() {
        let stub = Arc::new(StubChat {
            reply: Some("  An answer.  \n".to_string()),
            requests: Mutex::new(Vec::new()),
        });
        let generator = ResponseGenerator::new(stub.clone(), "model");

        let answer = generator
            .generate("question", "some context", AgentLabel::Retrieval, "Persona.")
            .await;
        assert_eq!(answer, "An answer.");

        let requests = stub.requests.lock().unwrap();
        let system = requests[0].system.as_deref().unwrap();
        assert!(system.starts_with("Persona."));
        assert!(system.contains("Context from RAG_Agent:"));
        assert!(system.contains("some context"));
        assert_eq!(requests[0].user, "question");
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[0].max_tokens, Some(1500));
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_provider_failure() {
        let generator = ResponseGenerator::new(
            Arc::new(StubChat {
                reply: None,
                requests: Mutex::new(Vec::new()),
            }),
            "model",
        );

        let answer = generator
            .generate("q", "ctx", AgentLabel::WebSearch, "Persona.")
            .await;
        assert_eq!(answer, GENERATION_FALLBACK);
    }

    #[tokio::test]
    async fn test_disabled_generator_answers_fallback() {
        let generator = ResponseGenerator::disabled();
        assert!(!generator.is_configured());

        let answer = generator
            .generate("q", "ctx", AgentLabel::Retrieval, "Persona.")
            .await;
        assert_eq!(answer, GENERATION_FALLBACK);
    }
}
