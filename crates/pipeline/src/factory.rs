//! Pipeline assembly from application configuration.
//!
//! This is the one place that knows which concrete provider backs each
//! component. Missing credentials disable the dependent component rather
//! than failing construction; the pipeline then serves degraded responses.

use crate::generator::ResponseGenerator;
use crate::orchestrator::ChatPipeline;
use crate::safety::SafetyClassifier;
use crate::store::{FileProjectStore, FileSessionStore};
use carebot_agents::{RetrievalAgent, Router, WebSearchAgent};
use carebot_core::{AppConfig, AppResult};
use carebot_providers::{GroqClient, HuggingFaceClient, PineconeClient, TavilyClient};
use std::sync::Arc;
use std::time::Duration;

/// Build a [`ChatPipeline`] from configuration.
pub fn build_pipeline(config: &AppConfig) -> AppResult<ChatPipeline> {
    // Chat-backed components share a provider but not a timeout:
    // classification calls get the short budget, generation the long one.
    let (router, generator, safety) = match &config.groq_api_key {
        Some(api_key) => {
            let classification_chat = Arc::new(GroqClient::new(
                &config.groq_base_url,
                api_key,
                Duration::from_secs(config.timeouts.classification_secs),
            )?);
            let generation_chat = Arc::new(GroqClient::new(
                &config.groq_base_url,
                api_key,
                Duration::from_secs(config.timeouts.generation_secs),
            )?);

            (
                Router::new(classification_chat.clone(), &config.models.router),
                ResponseGenerator::new(generation_chat, &config.models.generation),
                SafetyClassifier::new(classification_chat, &config.models.safety),
            )
        }
        None => {
            tracing::warn!("Chat provider not configured; routing, generation, and safety run degraded");
            (
                Router::disabled(),
                ResponseGenerator::disabled(),
                SafetyClassifier::disabled(),
            )
        }
    };

    // Embedding calls without a token fail at request time and degrade
    // through the retrieval agent's error path.
    let embeddings = Arc::new(HuggingFaceClient::new(
        &config.hf_base_url,
        &config.models.embedding,
        config.hf_token.clone().unwrap_or_default(),
        Duration::from_secs(config.timeouts.embedding_secs),
    )?);

    let retrieval = match (&config.pinecone_api_key, &config.pinecone_index_host) {
        (Some(api_key), Some(host)) => {
            let index = Arc::new(PineconeClient::new(
                host,
                api_key,
                Duration::from_secs(config.timeouts.vector_secs),
            )?);
            RetrievalAgent::new(embeddings, index)
        }
        _ => {
            tracing::warn!("Vector index not configured; retrieval runs degraded");
            RetrievalAgent::without_index(embeddings)
        }
    };

    let web_search = match &config.tavily_api_key {
        Some(api_key) => {
            let client = Arc::new(TavilyClient::new(
                api_key,
                Duration::from_secs(config.timeouts.search_secs),
            )?);
            WebSearchAgent::new(client)
        }
        None => {
            tracing::warn!("Web search not configured; agent reports unavailable");
            WebSearchAgent::disabled()
        }
    };

    let sessions = Arc::new(FileSessionStore::new(&config.data_dir));
    let projects = Arc::new(FileProjectStore::new(&config.data_dir));

    Ok(ChatPipeline::new(
        router, retrieval, web_search, generator, safety, sessions, projects,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_credentials_yields_degraded_pipeline() {
        let config = AppConfig::default();
        let pipeline = build_pipeline(&config).unwrap();

        let status = pipeline.status();
        assert!(!status.router);
        assert!(!status.retrieval);
        assert!(!status.web_search);
        assert!(!status.generation);
        assert!(!status.safety);
    }

    #[test]
    fn test_build_with_credentials_enables_components() {
        let mut config = AppConfig::default();
        config.groq_api_key = Some("k".to_string());
        config.hf_token = Some("t".to_string());
        config.pinecone_api_key = Some("p".to_string());
        config.pinecone_index_host = Some("https://idx.example.io".to_string());
        config.tavily_api_key = Some("v".to_string());

        let pipeline = build_pipeline(&config).unwrap();

        let status = pipeline.status();
        assert!(status.router);
        assert!(status.retrieval);
        assert!(status.web_search);
        assert!(status.generation);
        assert!(status.safety);
    }
}
