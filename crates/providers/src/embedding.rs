//! Embedding client abstraction.

use carebot_core::{AppError, AppResult};

/// Trait for embedding providers.
///
/// Turns text into fixed-length numeric vectors via an external inference
/// endpoint. Must tolerate single- or multi-text batches.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Get the provider name (e.g., "huggingface").
    fn provider_name(&self) -> &str;

    /// Generate embeddings for a batch of texts.
    ///
    /// Returns one vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text (convenience method).
    async fn embed_one(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Provider("No embedding returned".to_string()))
    }
}
