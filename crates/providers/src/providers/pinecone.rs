//! Pinecone vector index provider.
//!
//! REST client for a serverless Pinecone index. The index host is an
//! index-specific URL obtained from the Pinecone console.

use crate::vector::{VectorIndexClient, VectorMatch, VectorRecord};
use carebot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

/// Pinecone vector index client.
pub struct PineconeClient {
    /// Index host URL
    host: String,

    /// API key
    api_key: String,

    /// HTTP client with explicit timeout
    client: reqwest::Client,
}

impl PineconeClient {
    /// Create a new Pinecone client for the given index host.
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            host: host.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl VectorIndexClient for PineconeClient {
    fn provider_name(&self) -> &str {
        "pinecone"
    }

    async fn upsert(&self, records: &[VectorRecord]) -> AppResult<()> {
        tracing::debug!(count = records.len(), "Upserting vectors");

        let url = format!("{}/vectors/upsert", self.host);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { vectors: records })
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Vector upsert failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Vector index error ({}): {}",
                status, error_text
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> AppResult<Vec<VectorMatch>> {
        tracing::debug!(top_k, "Querying vector index");

        let url = format!("{}/query", self.host);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata,
            })
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Vector query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Vector index error ({}): {}",
                status, error_text
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse query response: {}", e)))?;

        Ok(query_response.matches)
    }
}
