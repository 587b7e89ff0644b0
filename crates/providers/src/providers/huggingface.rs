//! HuggingFace Inference API embedding provider.
//!
//! Uses the feature-extraction endpoint. The endpoint's response shape
//! depends on the batch size: a single input may come back as one flat
//! vector, a batch as a list of vectors. Both shapes are handled here.

use crate::embedding::EmbeddingClient;
use carebot_core::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum FeatureExtractionInput<'a> {
    Single { inputs: &'a str },
    Batch { inputs: &'a [String] },
}

/// HuggingFace Inference API embedding client.
pub struct HuggingFaceClient {
    /// Inference API base URL
    base_url: String,

    /// Embedding model identifier (e.g., "sentence-transformers/all-MiniLM-L6-v2")
    model: String,

    /// Bearer token
    token: String,

    /// HTTP client with explicit timeout
    client: reqwest::Client,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace embedding client.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            token: token.into(),
            client,
        })
    }

    /// Normalize the endpoint's response into one vector per input.
    ///
    /// Single inputs may yield a flat `[f32]`, batches a `[[f32]]`.
    fn parse_embeddings(value: Value) -> AppResult<Vec<Vec<f32>>> {
        let outer = match value {
            Value::Array(items) => items,
            other => {
                return Err(AppError::Provider(format!(
                    "Unexpected embedding response shape: {}",
                    other
                )))
            }
        };

        if outer.is_empty() {
            return Err(AppError::Provider(
                "Empty embedding response".to_string(),
            ));
        }

        // Nested: list of vectors
        if outer[0].is_array() {
            let mut vectors = Vec::with_capacity(outer.len());
            for item in outer {
                vectors.push(Self::parse_vector(item)?);
            }
            return Ok(vectors);
        }

        // Flat: a single vector
        Ok(vec![Self::parse_vector(Value::Array(outer))?])
    }

    fn parse_vector(value: Value) -> AppResult<Vec<f32>> {
        let items = value
            .as_array()
            .ok_or_else(|| AppError::Provider("Embedding is not an array".to_string()))?;

        items
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| AppError::Provider("Non-numeric embedding value".to_string()))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for HuggingFaceClient {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.model, count = texts.len(), "Requesting embeddings");

        let url = format!("{}/models/{}", self.base_url, self.model);

        // Single texts go up unwrapped, matching the endpoint's contract
        let payload = if texts.len() == 1 {
            FeatureExtractionInput::Single { inputs: &texts[0] }
        } else {
            FeatureExtractionInput::Batch { inputs: texts }
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse embedding response: {}", e)))?;

        let vectors = Self::parse_embeddings(value)?;

        if vectors.len() != texts.len() {
            return Err(AppError::Provider(format!(
                "Embedding count mismatch: {} inputs, {} vectors",
                texts.len(),
                vectors.len()
            )));
        }

        Ok(vectors)
    }
}
