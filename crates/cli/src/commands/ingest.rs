//! Ingest command handler.
//!
//! Reads text documents from a file or directory and adds them to the
//! knowledge base via the retrieval agent.

use carebot_agents::DocumentInput;
use carebot_core::{AppConfig, AppError, AppResult};
use carebot_pipeline::build_pipeline;
use clap::Args;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions accepted for ingestion.
const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Add documents to the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// File or directory to ingest
    pub path: PathBuf,

    /// Project identifier
    #[arg(short, long)]
    pub project: String,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for {:?}", self.path);

        if !self.path.exists() {
            return Err(AppError::Config(format!(
                "Path does not exist: {:?}",
                self.path
            )));
        }

        let documents = self.collect_documents()?;
        if documents.is_empty() {
            return Err(AppError::Config(format!(
                "No .txt or .md files found under {:?}",
                self.path
            )));
        }

        println!("Ingesting {} document(s)...", documents.len());

        let pipeline = build_pipeline(config)?;

        if pipeline.ingest_documents(&documents).await {
            println!("Added {} document(s) to the knowledge base.", documents.len());
            Ok(())
        } else {
            Err(AppError::Agent(
                "Ingestion failed; check that the vector index and embedding provider are configured"
                    .to_string(),
            ))
        }
    }

    /// Collect text documents from the target path.
    fn collect_documents(&self) -> AppResult<Vec<DocumentInput>> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(&self.path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() || !is_text_file(entry.path()) {
                continue;
            }

            let text = std::fs::read_to_string(entry.path())?;
            if text.trim().is_empty() {
                tracing::warn!("Skipping empty file {:?}", entry.path());
                continue;
            }

            let mut metadata = serde_json::Map::new();
            metadata.insert(
                "source_file".to_string(),
                serde_json::Value::String(entry.path().display().to_string()),
            );
            metadata.insert(
                "project_id".to_string(),
                serde_json::Value::String(self.project.clone()),
            );

            documents.push(DocumentInput { text, metadata });
        }

        Ok(documents)
    }
}

/// Whether the path has an accepted text extension.
fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
