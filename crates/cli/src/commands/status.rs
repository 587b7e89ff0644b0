//! Status command handler.

use carebot_core::{AppConfig, AppResult};
use carebot_pipeline::build_pipeline;
use clap::Args;

/// Show component availability
#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Execute the status command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let pipeline = build_pipeline(config)?;
        let status = pipeline.status();

        println!("router:     {}", describe(status.router));
        println!("retrieval:  {}", describe(status.retrieval));
        println!("web search: {}", describe(status.web_search));
        println!("generation: {}", describe(status.generation));
        println!("safety:     {}", describe(status.safety));

        Ok(())
    }
}

fn describe(configured: bool) -> &'static str {
    if configured {
        "active"
    } else {
        "degraded (not configured)"
    }
}
