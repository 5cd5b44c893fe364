//! Project storage trait.
//!
//! Defines the interface for the file-backed project store. All calls are
//! keyed by an explicit project directory string; there is no ambient
//! "current project" in the storage layer.

use crate::app_state::AppState;
use crate::chapter::{Chapter, ChapterIndexItem};
use crate::chat::{ChatSession, ChatSessionIndexItem};
use crate::error::Result;
use crate::llm_config::LlmConfig;
use crate::preset::Preset;
use crate::project::ProjectInfo;
use crate::summary::SummaryRecord;
use async_trait::async_trait;

/// An abstract store for all project-scoped entities.
///
/// Implementations persist whole objects: every save is a full replace of
/// the addressed document, which is what lets the single-threaded
/// orchestrator stay race-free without a transaction abstraction.
#[async_trait]
pub trait ProjectStorage: Send + Sync {
    /// Materializes and validates the project directory.
    ///
    /// May create on-disk structure (directories, default preset, default
    /// LLM config, an initial chapter), so it must run before any other
    /// per-project read. Opening a directory that has never been
    /// initialized yields a usable default project rather than an error.
    async fn init_project(&self, project_dir: &str) -> Result<ProjectInfo>;

    async fn list_chapters(&self, project_dir: &str) -> Result<Vec<ChapterIndexItem>>;

    /// Creates an empty chapter with the next sequential id.
    async fn create_chapter(&self, project_dir: &str, title: &str) -> Result<ChapterIndexItem>;

    async fn rename_chapter(&self, project_dir: &str, id: u32, title: &str) -> Result<()>;

    /// Deletes a chapter; already-missing files are not an error.
    async fn delete_chapter(&self, project_dir: &str, id: u32) -> Result<()>;

    /// Loads a full chapter. Missing chapters are a `NotFound` error.
    async fn load_chapter(&self, project_dir: &str, id: u32) -> Result<Chapter>;

    /// Saves a chapter verbatim and keeps the index title in sync.
    async fn save_chapter(&self, project_dir: &str, chapter: &Chapter) -> Result<()>;

    async fn load_preset(&self, project_dir: &str) -> Result<Preset>;

    async fn save_preset(&self, project_dir: &str, preset: &Preset) -> Result<()>;

    /// Writes a preset to an arbitrary file path, outside any project.
    async fn export_preset(&self, path: &str, preset: &Preset) -> Result<()>;

    /// Reads a preset from an arbitrary file path. A missing file is a
    /// `NotFound` error.
    async fn import_preset(&self, path: &str) -> Result<Preset>;

    async fn load_llm_config(&self, project_dir: &str) -> Result<LlmConfig>;

    async fn save_llm_config(&self, project_dir: &str, config: &LlmConfig) -> Result<()>;

    async fn load_summaries(&self, project_dir: &str) -> Result<Vec<SummaryRecord>>;

    /// Appends one record to the summary log.
    async fn append_summary(&self, project_dir: &str, record: &SummaryRecord) -> Result<()>;

    async fn list_sessions(&self, project_dir: &str) -> Result<Vec<ChatSessionIndexItem>>;

    /// Creates an empty chat session with a fresh id.
    async fn create_session(
        &self,
        project_dir: &str,
        title: Option<String>,
    ) -> Result<ChatSessionIndexItem>;

    /// Loads a full session. Missing sessions are a `NotFound` error.
    async fn load_session(&self, project_dir: &str, session_id: &str) -> Result<ChatSession>;

    /// Saves a session verbatim and keeps the index title in sync.
    async fn save_session(&self, project_dir: &str, session: &ChatSession) -> Result<()>;

    async fn delete_session(&self, project_dir: &str, session_id: &str) -> Result<()>;
}

/// Store for the process-wide "last opened" record.
///
/// Failure policy belongs to the caller: the orchestrator treats a failed
/// `load` as first-launch defaults and a failed `persist` as best-effort.
#[async_trait]
pub trait AppStateStore: Send + Sync {
    async fn load(&self) -> Result<AppState>;

    async fn persist(&self, state: &AppState) -> Result<()>;

    /// Directory to open on first launch, before any project was chosen.
    async fn default_project_dir(&self) -> Result<String>;
}
