//! Vector index client abstraction.
//!
//! The index is a remote managed service: it owns storage, similarity metric,
//! and result ordering. The client only upserts and queries.

use carebot_core::AppResult;
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// A vector with attached metadata, ready for upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique vector id
    pub id: String,

    /// Embedding values
    pub values: Vec<f32>,

    /// Arbitrary metadata stored alongside the vector
    pub metadata: Map<String, serde_json::Value>,
}

/// A single match returned by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Similarity score in [0, 1]
    pub score: f32,

    /// Metadata stored with the matched vector
    #[serde(default)]
    pub metadata: Map<String, serde_json::Value>,
}

/// Trait for vector index backends.
#[async_trait::async_trait]
pub trait VectorIndexClient: Send + Sync {
    /// Get the provider name (e.g., "pinecone").
    fn provider_name(&self) -> &str;

    /// Insert or update vectors in the index.
    async fn upsert(&self, records: &[VectorRecord]) -> AppResult<()>;

    /// Query the index for the top-k nearest neighbors.
    ///
    /// Matches are returned in the index's ranked order (descending score);
    /// callers must not re-sort.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> AppResult<Vec<VectorMatch>>;
}
