//! Persistence collaborator contracts and flat-file fallback stores.
//!
//! The pipeline does not own persistent state: session history and project
//! configuration live behind these traits. The managed datastore backs them
//! in production; the flat-file implementations here are the fallback and
//! the test vehicle. Append failures never invalidate an already-computed
//! answer — the orchestrator fires these calls and forgets them.

use carebot_agents::AgentLabel;
use carebot_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Persona used when a project has none configured (or the store fails).
pub const DEFAULT_PERSONA: &str = "You are a compassionate medical AI assistant that provides \
accurate health information while emphasizing the importance of consulting healthcare \
professionals.";

/// One completed user/assistant exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Project the exchange belongs to
    pub project_id: String,

    /// Session (conversation) identifier
    pub session_id: String,

    /// End user, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// The user's message
    pub user_text: String,

    /// The generated answer
    pub assistant_text: String,

    /// Which agent supplied the context
    pub agent_label: AgentLabel,

    /// When the exchange completed
    pub timestamp: DateTime<Utc>,
}

/// Store for session transcripts.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Append one exchange to the session record.
    async fn append_exchange(&self, record: &ExchangeRecord) -> AppResult<()>;
}

/// Store for per-project configuration.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// The project's configured persona, if any.
    async fn persona(&self, project_id: &str) -> AppResult<Option<String>>;

    /// The project's curated search domains (empty when unconfigured).
    async fn curated_domains(&self, project_id: &str) -> AppResult<Vec<String>>;
}

/// Flat-file session store: one JSON-lines file per project.
pub struct FileSessionStore {
    data_dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store writing under the given directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn project_file(&self, project_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.jsonl", project_id))
    }
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn append_exchange(&self, record: &ExchangeRecord) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.project_file(&record.project_id);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), "Appended exchange");
        Ok(())
    }
}

/// Per-project entry in `projects.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProjectEntry {
    /// Persona override for the project's bot
    bot_persona: Option<String>,

    /// Curated search domains
    #[serde(default)]
    curated_domains: Vec<String>,
}

/// Flat-file project store: a single `projects.yaml` map.
pub struct FileProjectStore {
    path: PathBuf,
}

impl FileProjectStore {
    /// Create a store reading project config from the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join("projects.yaml"),
        }
    }

    async fn load(&self) -> AppResult<HashMap<String, ProjectEntry>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let contents = tokio::fs::read_to_string(&self.path).await?;
        let entries: HashMap<String, ProjectEntry> =
            serde_yaml::from_str(&contents).map_err(|e| {
                AppError::Config(format!(
                    "Failed to parse project config {:?}: {}",
                    self.path, e
                ))
            })?;

        Ok(entries)
    }
}

#[async_trait::async_trait]
impl ProjectStore for FileProjectStore {
    async fn persona(&self, project_id: &str) -> AppResult<Option<String>> {
        let entries = self.load().await?;
        Ok(entries.get(project_id).and_then(|e| e.bot_persona.clone()))
    }

    async fn curated_domains(&self, project_id: &str) -> AppResult<Vec<String>> {
        let entries = self.load().await?;
        Ok(entries
            .get(project_id)
            .map(|e| e.curated_domains.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(project_id: &str, user_text: &str) -> ExchangeRecord {
        ExchangeRecord {
            project_id: project_id.to_string(),
            session_id: "session-1".to_string(),
            user_id: None,
            user_text: user_text.to_string(),
            assistant_text: "answer".to_string(),
            agent_label: AgentLabel::Retrieval,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_exchange_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.append_exchange(&record("proj", "first")).await.unwrap();
        store.append_exchange(&record("proj", "second")).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join("proj.jsonl")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: ExchangeRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.user_text, "first");
        assert_eq!(parsed.agent_label, AgentLabel::Retrieval);
    }

    #[tokio::test]
    async fn test_sessions_are_partitioned_by_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.append_exchange(&record("alpha", "a")).await.unwrap();
        store.append_exchange(&record("beta", "b")).await.unwrap();

        assert!(dir.path().join("alpha.jsonl").exists());
        assert!(dir.path().join("beta.jsonl").exists());
    }

    #[tokio::test]
    async fn test_project_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProjectStore::new(dir.path());

        assert_eq!(store.persona("any").await.unwrap(), None);
        assert!(store.curated_domains("any").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_project_store_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("projects.yaml"),
            "clinic:\n  bot_persona: \"You are the clinic assistant.\"\n  curated_domains:\n    - mayoclinic.org\n",
        )
        .unwrap();

        let store = FileProjectStore::new(dir.path());
        assert_eq!(
            store.persona("clinic").await.unwrap().as_deref(),
            Some("You are the clinic assistant.")
        );
        assert_eq!(
            store.curated_domains("clinic").await.unwrap(),
            vec!["mayoclinic.org".to_string()]
        );
        assert_eq!(store.persona("other").await.unwrap(), None);
    }
}
