//! Command handlers for the Carebot CLI.

mod chat;
mod ingest;
mod status;

pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use status::StatusCommand;
