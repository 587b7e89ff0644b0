//! Pipeline crate for Carebot.
//!
//! Composes the agents into the full request flow: Router → chosen agent →
//! Response Generator → Safety Classifier, with fire-and-forget session
//! persistence. Degradation over failure throughout: every stage has a
//! total fallback, and the only caller-visible error is a blank message.

pub mod factory;
pub mod generator;
pub mod orchestrator;
pub mod safety;
pub mod store;

// Re-export main types
pub use factory::build_pipeline;
pub use generator::{ResponseGenerator, GENERATION_FALLBACK};
pub use orchestrator::{ChatOutcome, ChatPipeline, PipelineStatus, Query};
pub use safety::{SafetyClassifier, FAIL_OPEN_VERDICT};
pub use store::{
    ExchangeRecord, FileProjectStore, FileSessionStore, ProjectStore, SessionStore,
    DEFAULT_PERSONA,
};
