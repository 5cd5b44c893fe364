//! JSON-file-backed ProjectStorage implementation.
//!
//! One project is a plain directory: chapter bodies as text files, chapter
//! metadata and every other entity as JSON documents. Indexes are separate
//! files kept in sync on each save so listing stays cheap.

use crate::json_store::{read_json_or, remove_file_if_exists, write_json_atomic};
use crate::paths::ProjectPaths;
use async_trait::async_trait;
use quill_core::chat::DEFAULT_SESSION_TITLE;
use quill_core::{
    Chapter, ChapterIndexItem, ChatSession, ChatSessionIndexItem, EndpointConfig, LlmConfig,
    Preset, ProjectInfo, ProjectStorage, QuillError, Result, SummaryRecord,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

/// Chapter metadata sidecar (`chapter_NNN.json`); the body lives in the
/// matching `.txt` file.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterMeta {
    id: u32,
    title: String,
    #[serde(default)]
    summary: String,
}

/// File-backed project store.
#[derive(Default)]
pub struct JsonProjectStorage;

impl JsonProjectStorage {
    pub fn new() -> Self {
        Self
    }

    /// Rewrites the chapter index so the entry for `chapter` carries its
    /// current title, inserting a missing entry.
    async fn sync_chapter_index(&self, paths: &ProjectPaths, chapter: &Chapter) -> Result<()> {
        let mut index: Vec<ChapterIndexItem> =
            read_json_or(&paths.chapters_index(), Vec::new).await?;
        match index.iter_mut().find(|item| item.id == chapter.id) {
            Some(item) => item.title = chapter.title.clone(),
            None => index.push(ChapterIndexItem {
                id: chapter.id,
                title: chapter.title.clone(),
            }),
        }
        write_json_atomic(&paths.chapters_index(), &index).await
    }

    /// Same title sync for the chat session index.
    async fn sync_session_index(&self, paths: &ProjectPaths, session: &ChatSession) -> Result<()> {
        let mut index: Vec<ChatSessionIndexItem> =
            read_json_or(&paths.sessions_index(), Vec::new).await?;
        match index.iter_mut().find(|item| item.id == session.id) {
            Some(item) => item.title = session.title.clone(),
            None => index.push(ChatSessionIndexItem {
                id: session.id.clone(),
                title: session.title.clone(),
            }),
        }
        write_json_atomic(&paths.sessions_index(), &index).await
    }
}

#[async_trait]
impl ProjectStorage for JsonProjectStorage {
    async fn init_project(&self, project_dir: &str) -> Result<ProjectInfo> {
        let paths = ProjectPaths::new(project_dir);
        fs::create_dir_all(paths.root()).await?;
        fs::create_dir_all(paths.chapters_dir()).await?;
        fs::create_dir_all(paths.sessions_dir()).await?;

        // Seed defaults only for files that do not exist yet; reopening an
        // existing project must not touch its documents.
        if !paths.preset_file().exists() {
            write_json_atomic(&paths.preset_file(), &Preset::default_for_writing()).await?;
        }

        if !paths.llm_config_file().exists() {
            let endpoint = EndpointConfig::new(
                "Default",
                "https://api.openai.com/v1",
                "gpt-4o-mini",
            );
            let config = LlmConfig {
                active_endpoint_id: Some(endpoint.id.clone()),
                active_model: Some(endpoint.default_model.clone()),
                endpoints: vec![endpoint],
            };
            write_json_atomic(&paths.llm_config_file(), &config).await?;
        }

        if !paths.summaries_file().exists() {
            write_json_atomic(&paths.summaries_file(), &Vec::<SummaryRecord>::new()).await?;
        }

        if !paths.chapters_index().exists() {
            let first = Chapter::new(1, "Chapter 1");
            self.save_chapter(project_dir, &first).await?;
        }

        Ok(ProjectInfo {
            project_dir: paths.root().to_string_lossy().to_string(),
            project_name: paths.project_name(),
        })
    }

    async fn list_chapters(&self, project_dir: &str) -> Result<Vec<ChapterIndexItem>> {
        let paths = ProjectPaths::new(project_dir);
        read_json_or(&paths.chapters_index(), Vec::new).await
    }

    async fn create_chapter(&self, project_dir: &str, title: &str) -> Result<ChapterIndexItem> {
        let index = self.list_chapters(project_dir).await?;
        let next_id = index.iter().map(|c| c.id).max().unwrap_or(0) + 1;

        let chapter = Chapter::new(next_id, title);
        self.save_chapter(project_dir, &chapter).await?;

        Ok(ChapterIndexItem {
            id: next_id,
            title: title.to_string(),
        })
    }

    async fn rename_chapter(&self, project_dir: &str, id: u32, title: &str) -> Result<()> {
        let mut chapter = self.load_chapter(project_dir, id).await?;
        chapter.title = title.to_string();
        self.save_chapter(project_dir, &chapter).await
    }

    async fn delete_chapter(&self, project_dir: &str, id: u32) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        let mut index: Vec<ChapterIndexItem> =
            read_json_or(&paths.chapters_index(), Vec::new).await?;
        index.retain(|c| c.id != id);
        write_json_atomic(&paths.chapters_index(), &index).await?;

        remove_file_if_exists(&paths.chapter_body(id)).await?;
        remove_file_if_exists(&paths.chapter_meta(id)).await?;
        Ok(())
    }

    async fn load_chapter(&self, project_dir: &str, id: u32) -> Result<Chapter> {
        let paths = ProjectPaths::new(project_dir);
        let content = match fs::read_to_string(paths.chapter_body(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuillError::not_found("chapter", id));
            }
            Err(e) => return Err(e.into()),
        };

        let meta_path = paths.chapter_meta(id);
        let (title, summary) = match fs::read_to_string(&meta_path).await {
            Ok(raw) => {
                let meta: ChapterMeta = serde_json::from_str(&raw)?;
                (meta.title, meta.summary)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Metadata lost; fall back to the index title.
                let index = self.list_chapters(project_dir).await.unwrap_or_default();
                let title = index
                    .into_iter()
                    .find(|c| c.id == id)
                    .map(|c| c.title)
                    .unwrap_or_else(|| format!("Chapter {id}"));
                (title, String::new())
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Chapter {
            id,
            title,
            content,
            summary,
        })
    }

    async fn save_chapter(&self, project_dir: &str, chapter: &Chapter) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        fs::create_dir_all(paths.chapters_dir()).await?;

        fs::write(paths.chapter_body(chapter.id), &chapter.content).await?;

        let meta = ChapterMeta {
            id: chapter.id,
            title: chapter.title.clone(),
            summary: chapter.summary.clone(),
        };
        write_json_atomic(&paths.chapter_meta(chapter.id), &meta).await?;

        self.sync_chapter_index(&paths, chapter).await
    }

    async fn load_preset(&self, project_dir: &str) -> Result<Preset> {
        let paths = ProjectPaths::new(project_dir);
        read_json_or(&paths.preset_file(), Preset::default_for_writing).await
    }

    async fn save_preset(&self, project_dir: &str, preset: &Preset) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        write_json_atomic(&paths.preset_file(), preset).await
    }

    async fn export_preset(&self, path: &str, preset: &Preset) -> Result<()> {
        write_json_atomic(Path::new(path), preset).await
    }

    async fn import_preset(&self, path: &str) -> Result<Preset> {
        match fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(QuillError::not_found("preset file", path))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load_llm_config(&self, project_dir: &str) -> Result<LlmConfig> {
        let paths = ProjectPaths::new(project_dir);
        read_json_or(&paths.llm_config_file(), LlmConfig::default).await
    }

    async fn save_llm_config(&self, project_dir: &str, config: &LlmConfig) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        write_json_atomic(&paths.llm_config_file(), config).await
    }

    async fn load_summaries(&self, project_dir: &str) -> Result<Vec<SummaryRecord>> {
        let paths = ProjectPaths::new(project_dir);
        read_json_or(&paths.summaries_file(), Vec::new).await
    }

    async fn append_summary(&self, project_dir: &str, record: &SummaryRecord) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        let mut all: Vec<SummaryRecord> = read_json_or(&paths.summaries_file(), Vec::new).await?;
        all.push(record.clone());
        write_json_atomic(&paths.summaries_file(), &all).await
    }

    async fn list_sessions(&self, project_dir: &str) -> Result<Vec<ChatSessionIndexItem>> {
        let paths = ProjectPaths::new(project_dir);
        read_json_or(&paths.sessions_index(), Vec::new).await
    }

    async fn create_session(
        &self,
        project_dir: &str,
        title: Option<String>,
    ) -> Result<ChatSessionIndexItem> {
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            title: title.unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string()),
            messages: vec![],
        };
        self.save_session(project_dir, &session).await?;

        Ok(ChatSessionIndexItem {
            id: session.id,
            title: session.title,
        })
    }

    async fn load_session(&self, project_dir: &str, session_id: &str) -> Result<ChatSession> {
        let paths = ProjectPaths::new(project_dir);
        match fs::read_to_string(paths.session_file(session_id)).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(QuillError::not_found("chat session", session_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_session(&self, project_dir: &str, session: &ChatSession) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        fs::create_dir_all(paths.sessions_dir()).await?;
        write_json_atomic(&paths.session_file(&session.id), session).await?;
        self.sync_session_index(&paths, session).await
    }

    async fn delete_session(&self, project_dir: &str, session_id: &str) -> Result<()> {
        let paths = ProjectPaths::new(project_dir);
        remove_file_if_exists(&paths.session_file(session_id)).await?;

        let mut index: Vec<ChatSessionIndexItem> =
            read_json_or(&paths.sessions_index(), Vec::new).await?;
        index.retain(|s| s.id != session_id);
        write_json_atomic(&paths.sessions_index(), &index).await
    }
}
