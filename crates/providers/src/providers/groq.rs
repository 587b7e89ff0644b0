//! Groq chat completion provider.
//!
//! Speaks the OpenAI-compatible `/chat/completions` endpoint.

use crate::chat::{ChatClient, ChatRequest, ChatResponse};
use carebot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Groq API request format (OpenAI-compatible).
#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GroqMessage {
    role: &'static str,
    content: String,
}

/// Groq API response format.
#[derive(Debug, Deserialize)]
struct GroqResponse {
    model: String,
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    content: String,
}

/// Groq chat completion client.
pub struct GroqClient {
    /// Base URL for the OpenAI-compatible API
    base_url: String,

    /// API key
    api_key: String,

    /// HTTP client with explicit timeout
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a new Groq client.
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g., "https://api.groq.com/openai/v1")
    /// * `api_key` - Bearer token
    /// * `timeout` - Request timeout applied to every call
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert ChatRequest to the wire format.
    fn to_groq_request(&self, request: &ChatRequest) -> GroqRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = request.system {
            messages.push(GroqMessage {
                role: "system",
                content: system.clone(),
            });
        }

        messages.push(GroqMessage {
            role: "user",
            content: request.user.clone(),
        });

        GroqRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::debug!(model = %request.model, "Sending chat completion request");

        let groq_request = self.to_groq_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&groq_request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Chat completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Chat API error ({}): {}",
                status, error_text
            )));
        }

        let groq_response: GroqResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse chat response: {}", e)))?;

        let content = groq_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Provider("Chat response contained no choices".to_string()))?;

        tracing::debug!("Received chat completion");

        Ok(ChatResponse {
            content,
            model: groq_response.model,
        })
    }
}
