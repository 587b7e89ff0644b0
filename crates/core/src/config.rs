//! Configuration management for the Carebot pipeline.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables (provider credentials use their native names:
//!   `GROQ_API_KEY`, `HF_TOKEN`, `PINECONE_API_KEY`, `TAVILY_API_KEY`)
//! - Command-line flags
//! - Config files (carebot.yaml)
//!
//! Missing credentials are NOT a load-time error: each component detects an
//! absent credential at construction time, disables itself, and answers with
//! its documented degraded response instead.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default chat model used for routing, generation, and safety checks.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default embedding model served by the inference endpoint.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Directory for flat-file session/project storage
    pub data_dir: PathBuf,

    /// API key for the chat completion provider
    pub groq_api_key: Option<String>,

    /// Base URL for the chat completion provider (OpenAI-compatible)
    pub groq_base_url: String,

    /// Token for the embedding inference endpoint
    pub hf_token: Option<String>,

    /// Base URL for the embedding inference endpoint
    pub hf_base_url: String,

    /// API key for the managed vector index
    pub pinecone_api_key: Option<String>,

    /// Host URL of the vector index (index-specific endpoint)
    pub pinecone_index_host: Option<String>,

    /// API key for the web search provider
    pub tavily_api_key: Option<String>,

    /// Model identifiers per pipeline stage
    pub models: ModelConfig,

    /// Per-call-type timeouts in seconds
    pub timeouts: TimeoutConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Model identifiers for each external call type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used for routing classification
    pub router: String,

    /// Model used for final answer generation
    pub generation: String,

    /// Model used for the safety classifier
    pub safety: String,

    /// Embedding model identifier
    pub embedding: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            router: DEFAULT_CHAT_MODEL.to_string(),
            generation: DEFAULT_CHAT_MODEL.to_string(),
            safety: DEFAULT_CHAT_MODEL.to_string(),
            embedding: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

/// Timeouts for external calls, in seconds.
///
/// Every provider call carries an explicit timeout; on expiry the call is
/// treated like any other provider failure and the component's fallback
/// applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Routing and safety calls (small, deterministic outputs)
    pub classification_secs: u64,

    /// Final answer generation
    pub generation_secs: u64,

    /// Embedding inference
    pub embedding_secs: u64,

    /// Vector index queries and upserts
    pub vector_secs: u64,

    /// Web search
    pub search_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            classification_secs: 15,
            generation_secs: 30,
            embedding_secs: 30,
            vector_secs: 10,
            search_secs: 20,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    models: Option<ModelConfig>,
    timeouts: Option<TimeoutConfig>,
    endpoints: Option<EndpointConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EndpointConfig {
    groq_base_url: Option<String>,
    hf_base_url: Option<String>,
    pinecone_index_host: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            data_dir: PathBuf::from("./data"),
            groq_api_key: None,
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            hf_token: None,
            hf_base_url: "https://api-inference.huggingface.co".to_string(),
            pinecone_api_key: None,
            pinecone_index_host: None,
            tavily_api_key: None,
            models: ModelConfig::default(),
            timeouts: TimeoutConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `CAREBOT_CONFIG`: Path to config file
    /// - `CAREBOT_DATA_DIR`: Flat-file storage directory
    /// - `GROQ_API_KEY`, `HF_TOKEN`, `PINECONE_API_KEY`,
    ///   `PINECONE_INDEX_HOST`, `TAVILY_API_KEY`: provider credentials
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("CAREBOT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if let Ok(data_dir) = std::env::var("CAREBOT_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("carebot.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Credentials come from the environment only, never from the file
        config.groq_api_key = non_empty_env("GROQ_API_KEY");
        config.hf_token = non_empty_env("HF_TOKEN");
        config.pinecone_api_key = non_empty_env("PINECONE_API_KEY");
        config.tavily_api_key = non_empty_env("TAVILY_API_KEY");

        if let Some(host) = non_empty_env("PINECONE_INDEX_HOST") {
            config.pinecone_index_host = Some(host);
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(models) = config_file.models {
            result.models = models;
        }

        if let Some(timeouts) = config_file.timeouts {
            result.timeouts = timeouts;
        }

        if let Some(endpoints) = config_file.endpoints {
            if let Some(url) = endpoints.groq_base_url {
                result.groq_base_url = url;
            }
            if let Some(url) = endpoints.hf_base_url {
                result.hf_base_url = url;
            }
            if let Some(host) = endpoints.pinecone_index_host {
                result.pinecone_index_host = Some(host);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        data_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Ensure the data directory exists.
    pub fn ensure_data_dir(&self) -> AppResult<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                AppError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Whether the chat completion provider is configured.
    pub fn chat_configured(&self) -> bool {
        self.groq_api_key.is_some()
    }

    /// Whether the embedding provider is configured.
    pub fn embeddings_configured(&self) -> bool {
        self.hf_token.is_some()
    }

    /// Whether the vector index is configured.
    pub fn vector_index_configured(&self) -> bool {
        self.pinecone_api_key.is_some() && self.pinecone_index_host.is_some()
    }

    /// Whether the web search provider is configured.
    pub fn web_search_configured(&self) -> bool {
        self.tavily_api_key.is_some()
    }
}

/// Read an environment variable, treating empty values as unset.
fn non_empty_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
