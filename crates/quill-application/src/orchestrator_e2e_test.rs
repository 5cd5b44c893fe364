//! End-to-end tests: the orchestrator over the real file-backed storage,
//! with only the inference client and credential vault mocked.

use crate::orchestrator::{ApplyMode, SessionOrchestrator};
use async_trait::async_trait;
use quill_core::{
    ChatMessage, CredentialVault, GenerationResponse, InferenceClient, ProjectStorage, QuillError,
    Result,
};
use quill_infrastructure::{FileAppStateStore, JsonProjectStorage};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

struct ScriptedInference {
    storage: Arc<dyn ProjectStorage>,
    continuations: Mutex<VecDeque<GenerationResponse>>,
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedInference {
    fn new(storage: Arc<dyn ProjectStorage>) -> Self {
        Self {
            storage,
            continuations: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn fetch_models(&self, _base_url: &str, _endpoint_id: &str) -> Result<Vec<String>> {
        Ok(vec!["gpt-4o-mini".to_string()])
    }

    async fn continue_chapter(
        &self,
        _project_dir: &str,
        _chapter_id: u32,
        _instruction: &str,
    ) -> Result<GenerationResponse> {
        self.continuations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| QuillError::inference("no scripted continuation"))
    }

    async fn discuss(
        &self,
        project_dir: &str,
        session_id: &str,
        user_message: &str,
    ) -> Result<ChatMessage> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| QuillError::inference("no scripted reply"))?;
        let mut session = self.storage.load_session(project_dir, session_id).await?;
        session.messages.push(ChatMessage::user(user_message));
        let message = ChatMessage::assistant(reply);
        session.messages.push(message.clone());
        self.storage.save_session(project_dir, &session).await?;
        Ok(message)
    }
}

struct NoopVault;

#[async_trait]
impl CredentialVault for NoopVault {
    async fn has_key(&self, _endpoint_id: &str) -> Result<bool> {
        Ok(false)
    }

    async fn get_key(&self, _endpoint_id: &str) -> Result<String> {
        Err(QuillError::credential("no key stored"))
    }

    async fn set_key(&self, _endpoint_id: &str, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_key(&self, _endpoint_id: &str) -> Result<()> {
        Ok(())
    }
}

fn orchestrator_in(base: &TempDir) -> (Arc<SessionOrchestrator>, Arc<ScriptedInference>) {
    let storage: Arc<dyn ProjectStorage> = Arc::new(JsonProjectStorage::new());
    let inference = Arc::new(ScriptedInference::new(storage.clone()));
    let orchestrator = Arc::new(
        SessionOrchestrator::new(
            storage,
            inference.clone(),
            Arc::new(NoopVault),
            Arc::new(FileAppStateStore::new(base.path())),
        )
        .with_debounce(Duration::from_millis(20)),
    );
    (orchestrator, inference)
}

#[tokio::test]
async fn test_writing_session_survives_restart() {
    let base = TempDir::new().unwrap();
    let project_dir = base.path().join("novel").to_string_lossy().to_string();

    {
        let (orchestrator, inference) = orchestrator_in(&base);
        orchestrator.open_project(&project_dir).await.unwrap();

        orchestrator
            .update_chapter_content("It was a dark and stormy night.".to_string())
            .await;
        orchestrator.save_chapter().await.unwrap();

        inference.continuations.lock().unwrap().push_back(GenerationResponse {
            content: "The rain fell in sheets.".to_string(),
            summary: "A storm sets the scene.".to_string(),
            raw: None,
        });
        orchestrator.continue_generate("continue").await.unwrap();
        orchestrator
            .apply_generated(ApplyMode::Append)
            .await
            .unwrap();

        orchestrator.create_chapter("Chapter Two").await.unwrap();
        orchestrator
            .update_chapter_content("Morning came slowly.".to_string())
            .await;
        orchestrator.save_chapter().await.unwrap();
        orchestrator.shutdown();
    }

    // A fresh process restores the same project, chapter and logs.
    let (orchestrator, _) = orchestrator_in(&base);
    orchestrator.bootstrap().await.unwrap();
    let snap = orchestrator.snapshot().await;

    assert_eq!(snap.project.unwrap().project_name, "novel");
    assert_eq!(snap.chapters.len(), 2);
    let active = snap.active_chapter.unwrap();
    assert_eq!(active.id, 2);
    assert_eq!(active.content, "Morning came slowly.");
    assert!(!snap.dirty);

    assert_eq!(snap.summaries.len(), 1);
    assert_eq!(snap.summaries[0].summary, "A storm sets the scene.");

    let first = orchestrator.snapshot().await.chapters[0].id;
    orchestrator.select_chapter(first).await.unwrap();
    let chapter_one = orchestrator.snapshot().await.active_chapter.unwrap();
    assert_eq!(
        chapter_one.content,
        "It was a dark and stormy night.\nThe rain fell in sheets."
    );
    assert_eq!(chapter_one.summary, "A storm sets the scene.");
}

#[tokio::test]
async fn test_chat_log_survives_restart() {
    let base = TempDir::new().unwrap();
    let project_dir = base.path().join("novel").to_string_lossy().to_string();
    let session_id;

    {
        let (orchestrator, inference) = orchestrator_in(&base);
        orchestrator.open_project(&project_dir).await.unwrap();

        inference
            .replies
            .lock()
            .unwrap()
            .push_back("Try a flashback.".to_string());
        orchestrator
            .send_chat("How should this chapter open?")
            .await
            .unwrap();

        let snap = orchestrator.snapshot().await;
        session_id = snap.active_session.unwrap().id;
        orchestrator.shutdown();
    }

    let (orchestrator, _) = orchestrator_in(&base);
    orchestrator.bootstrap().await.unwrap();
    let snap = orchestrator.snapshot().await;

    let session = snap.active_session.unwrap();
    assert_eq!(session.id, session_id);
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].content, "How should this chapter open?");
    assert_eq!(session.messages[1].content, "Try a flashback.");
    assert_eq!(snap.sessions.len(), 1);
}
