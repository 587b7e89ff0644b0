//! External-service client crate for the Carebot pipeline.
//!
//! This crate provides trait-based abstractions over the four external
//! collaborators the pipeline consumes, plus concrete REST implementations:
//!
//! - **Chat completions** (`ChatClient` / `GroqClient`) — used by the Router,
//!   Response Generator, and Safety Classifier with different prompts.
//! - **Embeddings** (`EmbeddingClient` / `HuggingFaceClient`)
//! - **Vector index** (`VectorIndexClient` / `PineconeClient`)
//! - **Web search** (`WebSearchClient` / `TavilyClient`)
//!
//! Clients are constructed explicitly and injected into components as
//! `Arc<dyn …>` handles, so tests can substitute doubles without any
//! process-wide state.

pub mod chat;
pub mod embedding;
pub mod providers;
pub mod search;
pub mod vector;

// Re-export main types
pub use chat::{ChatClient, ChatRequest, ChatResponse};
pub use embedding::EmbeddingClient;
pub use providers::{GroqClient, HuggingFaceClient, PineconeClient, TavilyClient};
pub use search::{SearchDepth, SearchRequest, SearchResult, WebSearchClient};
pub use vector::{VectorIndexClient, VectorMatch, VectorRecord};
