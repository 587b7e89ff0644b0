//! Chat command handler.
//!
//! Runs one query through the full pipeline and prints the answer with
//! agent, provenance, and safety metadata.

use carebot_agents::Sources;
use carebot_core::{AppConfig, AppResult};
use carebot_pipeline::{build_pipeline, Query};
use clap::Args;

/// Run one query through the chat pipeline
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The message to send
    pub message: String,

    /// Project identifier
    #[arg(short, long)]
    pub project: String,

    /// Conversation identifier (generated when omitted)
    #[arg(short, long)]
    pub session: Option<String>,

    /// User identifier
    #[arg(short, long)]
    pub user: Option<String>,

    /// Output the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let pipeline = build_pipeline(config)?;

        let outcome = pipeline
            .handle(Query {
                message: self.message.clone(),
                project_id: self.project.clone(),
                session_id: self.session.clone(),
                user_id: self.user.clone(),
            })
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        println!("{}", outcome.response);
        println!();
        println!("agent: {}", outcome.agent_used);
        println!("safe:  {}", outcome.safe);

        match &outcome.sources {
            Sources::KnowledgeBase { count, .. } => {
                println!("sources: {} knowledge-base document(s)", count)
            }
            Sources::Web { results } => println!("sources: {} web result(s)", results.len()),
            Sources::General { description } => println!("sources: general ({})", description),
            Sources::Error { description } => println!("sources: degraded ({})", description),
        }

        Ok(())
    }
}
