//! Knowledge-base retrieval agent (RAG).
//!
//! Embeds the query, similarity-searches the vector index, filters by
//! threshold, and assembles a bounded context with provenance. Retrieval
//! must never crash the pipeline: every failure degrades to a usable
//! `AgentContext`.

use crate::types::{preview, AgentContext, DocumentInput, DocumentSource, RetrievedDocument, Sources};
use carebot_core::AppResult;
use carebot_providers::{EmbeddingClient, VectorIndexClient, VectorRecord};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Matches at or below this similarity score are discarded.
pub const SIMILARITY_THRESHOLD: f32 = 0.7;

/// Default number of nearest neighbors requested from the index.
pub const DEFAULT_TOP_K: usize = 5;

/// Default character budget for the assembled context.
pub const DEFAULT_CONTEXT_LIMIT: usize = 3000;

/// Character cap for provenance previews.
const PREVIEW_CHARS: usize = 200;

/// Character cap for the text excerpt stored in vector metadata.
const METADATA_EXCERPT_CHARS: usize = 1000;

/// Context returned when the knowledge base has nothing relevant.
const GENERAL_FALLBACK_CONTEXT: &str =
    "No specific information found in knowledge base. Providing general medical knowledge.";

/// Context returned when retrieval itself failed.
const ERROR_FALLBACK_CONTEXT: &str =
    "Knowledge base temporarily unavailable. Providing general medical information.";

/// Agent that answers queries from the knowledge base via RAG.
pub struct RetrievalAgent {
    /// Embedding client
    embeddings: Arc<dyn EmbeddingClient>,

    /// Vector index; `None` when credentials were absent at construction
    index: Option<Arc<dyn VectorIndexClient>>,
}

impl RetrievalAgent {
    /// Create a retrieval agent with a connected vector index.
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndexClient>,
    ) -> Self {
        Self {
            embeddings,
            index: Some(index),
        }
    }

    /// Create a retrieval agent without a vector index.
    ///
    /// Searches yield no documents and context retrieval takes the
    /// general-knowledge fallback.
    pub fn without_index(embeddings: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            embeddings,
            index: None,
        }
    }

    /// Whether a vector index is wired in.
    pub fn is_configured(&self) -> bool {
        self.index.is_some()
    }

    /// Search the knowledge base for relevant documents.
    ///
    /// Embeds the query as a one-element batch, queries the index for
    /// `top_k` matches with metadata, and drops matches scoring at or
    /// below [`SIMILARITY_THRESHOLD`]. The index's ranked order is
    /// preserved; no local re-sorting.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedDocument>> {
        let Some(index) = &self.index else {
            tracing::warn!("Vector index not available");
            return Ok(Vec::new());
        };

        let query_embedding = self.embeddings.embed_one(query).await?;

        let matches = index.query(&query_embedding, top_k, true).await?;

        let relevant: Vec<RetrievedDocument> = matches
            .into_iter()
            .filter(|m| m.score > SIMILARITY_THRESHOLD)
            .map(|m| {
                let text = m
                    .metadata
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                RetrievedDocument {
                    text,
                    score: m.score,
                    metadata: m.metadata,
                }
            })
            .collect();

        tracing::info!(
            count = relevant.len(),
            "Found relevant documents for query: {}",
            preview(query, 50)
        );

        Ok(relevant)
    }

    /// Retrieve and assemble a bounded context for the query.
    ///
    /// Total: never returns an error. No relevant documents is a soft
    /// fallback (`success = true`, general-knowledge marker); a provider
    /// failure is a degraded response (`success = false`, fixed apology
    /// context).
    pub async fn retrieve_context(&self, query: &str, context_limit: usize) -> AgentContext {
        let docs = match self.search(query, DEFAULT_TOP_K).await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::error!("Knowledge base search failed: {}", e);
                return AgentContext {
                    context: ERROR_FALLBACK_CONTEXT.to_string(),
                    sources: Sources::Error {
                        description: "Knowledge base connection failed".to_string(),
                    },
                    success: false,
                    message: "Using general medical knowledge - knowledge base connection failed"
                        .to_string(),
                };
            }
        };

        if docs.is_empty() {
            return AgentContext {
                context: GENERAL_FALLBACK_CONTEXT.to_string(),
                sources: Sources::General {
                    description: "No relevant documents found".to_string(),
                },
                success: true,
                message: "Using general medical knowledge".to_string(),
            };
        }

        // Fill the context at document granularity: stop before a document
        // that would push past the budget, never cut one mid-text.
        let mut context_parts = Vec::new();
        let mut documents = Vec::new();
        let mut current_length = 0;

        for doc in &docs {
            if current_length + doc.text.len() > context_limit {
                break;
            }

            context_parts.push(doc.text.as_str());
            documents.push(DocumentSource {
                text: preview(&doc.text, PREVIEW_CHARS),
                score: doc.score,
                metadata: doc.metadata.clone(),
            });
            current_length += doc.text.len();
        }

        let count = documents.len();

        AgentContext {
            context: context_parts.join("\n\n"),
            sources: Sources::KnowledgeBase { count, documents },
            success: true,
            message: format!("Found {} relevant documents", count),
        }
    }

    /// Add documents to the knowledge base.
    ///
    /// Embeds each non-empty document, derives a content-based id, and
    /// upserts the vector with a metadata text excerpt. Returns `false`
    /// when no documents were valid or the index is unavailable; never
    /// propagates an error.
    pub async fn add_documents(&self, documents: &[DocumentInput]) -> bool {
        let Some(index) = &self.index else {
            tracing::warn!("Vector index not available, skipping ingestion");
            return false;
        };

        let mut records = Vec::new();

        for (i, doc) in documents.iter().enumerate() {
            if doc.text.is_empty() {
                continue;
            }

            let embedding = match self.embeddings.embed_one(&doc.text).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    tracing::error!("Failed to embed document {}: {}", i, e);
                    return false;
                }
            };

            let mut metadata = doc.metadata.clone();
            metadata.insert(
                "text".to_string(),
                serde_json::Value::String(excerpt(&doc.text, METADATA_EXCERPT_CHARS)),
            );

            records.push(VectorRecord {
                id: content_id(&doc.text, i),
                values: embedding,
                metadata,
            });
        }

        if records.is_empty() {
            tracing::warn!("No valid documents to add");
            return false;
        }

        match index.upsert(&records).await {
            Ok(()) => {
                tracing::info!(count = records.len(), "Added documents to knowledge base");
                true
            }
            Err(e) => {
                tracing::error!("Failed to upsert documents: {}", e);
                false
            }
        }
    }
}

/// Derive a stable, content-based vector id.
fn content_id(text: &str, position: usize) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hash_prefix: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("doc_{}_{}", hash_prefix, position)
}

/// Take the first `max_chars` characters without an ellipsis.
fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
