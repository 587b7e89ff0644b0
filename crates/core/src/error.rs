//! Error types for the Carebot pipeline.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, provider calls, agent execution,
//! pipeline coordination, and serialization.

use thiserror::Error;

/// Unified error type for the Carebot pipeline.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// Note that most pipeline components deliberately do NOT propagate provider
/// errors to their callers: each stage has a documented fallback value and
/// converts failures into degraded-but-valid output. `AppError` is what the
/// provider clients themselves speak; the agents absorb it.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External provider errors (LLM, embeddings, vector index, web search)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Agent execution errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Pipeline coordination errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
