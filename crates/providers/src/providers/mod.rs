//! Concrete provider implementations.

pub mod groq;
pub mod huggingface;
pub mod pinecone;
pub mod tavily;

pub use groq::GroqClient;
pub use huggingface::HuggingFaceClient;
pub use pinecone::PineconeClient;
pub use tavily::TavilyClient;
