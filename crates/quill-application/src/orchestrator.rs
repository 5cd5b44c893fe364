//! Session orchestrator.
//!
//! The stateful coordinator behind the editor shell: it owns the in-memory
//! copies of every project-scoped entity, decides when and what to persist,
//! resolves "what was last open" across restarts, and reconciles optimistic
//! UI updates with authoritative reloads.
//!
//! All orchestration runs on one logical thread of control; storage and
//! network calls are the only suspension points. The informal discipline is
//! "one active chapter, one active session, whole-object replace on
//! persist", with saves treated as idempotent so an overlapping debounce
//! save and navigation flush cannot corrupt anything.

use crate::app_state_manager::AppStateManager;
use crate::autosave::Autosave;
use crate::snapshot::{AiMode, BusyFlags, SessionSnapshot};
use quill_core::{
    AppState, AppStateStore, Chapter, ChapterIndexItem, ChatMessage, ChatSession,
    ChatSessionIndexItem, CredentialVault, EndpointConfig, GenerationResponse, InferenceClient,
    LlmConfig, ModelParameters, Preset, ProjectInfo, ProjectStorage, QuillError, Result,
    SummaryRecord,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Debounce window between a keystroke burst and its autosave.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(600);

/// How a pending generation result is written into the chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Old content, a single gluing newline when needed, then the result.
    Append,
    /// The result verbatim.
    Replace,
}

/// A continuation result waiting for the user's apply/discard decision,
/// tagged with the chapter it was requested for.
#[derive(Debug, Clone)]
struct PendingGeneration {
    chapter_id: u32,
    response: GenerationResponse,
}

/// Everything the orchestrator holds in memory for one open project.
#[derive(Default)]
struct SessionState {
    project: Option<ProjectInfo>,
    chapters: Vec<ChapterIndexItem>,
    active_chapter: Option<Chapter>,
    /// Snapshot of the active chapter as last successfully persisted; the
    /// dirty check compares content against this.
    last_saved: Option<Chapter>,
    preset: Option<Preset>,
    preset_draft: Option<Preset>,
    llm_config: Option<LlmConfig>,
    models: Vec<String>,
    summaries: Vec<SummaryRecord>,
    sessions: Vec<ChatSessionIndexItem>,
    active_session: Option<ChatSession>,
    ai_mode: AiMode,
    generated: Option<PendingGeneration>,
    busy: BusyFlags,
}

impl SessionState {
    fn dirty(&self) -> bool {
        match (&self.active_chapter, &self.last_saved) {
            (Some(active), Some(saved)) => active.content != saved.content,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// Which chapter/session a project load should restore.
#[derive(Debug, Clone, Default)]
struct RestoreTargets {
    chapter_id: Option<u32>,
    session_id: Option<String>,
}

impl RestoreTargets {
    fn from_app_state(state: &AppState) -> Self {
        Self {
            chapter_id: state.last_chapter_id,
            session_id: state.last_session_id.clone(),
        }
    }
}

/// Fully loaded project, staged before being published.
struct StagedProject {
    project: ProjectInfo,
    chapters: Vec<ChapterIndexItem>,
    active_chapter: Option<Chapter>,
    preset: Preset,
    llm_config: LlmConfig,
    summaries: Vec<SummaryRecord>,
    sessions: Vec<ChatSessionIndexItem>,
    active_session: Option<ChatSession>,
}

/// The session orchestrator.
///
/// Collaborators are trait objects so tests can substitute in-memory
/// doubles for storage, credentials and inference.
pub struct SessionOrchestrator {
    storage: Arc<dyn ProjectStorage>,
    inference: Arc<dyn InferenceClient>,
    vault: Arc<dyn CredentialVault>,
    app_state: AppStateManager,
    state: RwLock<SessionState>,
    autosave: Autosave,
    debounce: Duration,
}

impl SessionOrchestrator {
    pub fn new(
        storage: Arc<dyn ProjectStorage>,
        inference: Arc<dyn InferenceClient>,
        vault: Arc<dyn CredentialVault>,
        app_state_store: Arc<dyn AppStateStore>,
    ) -> Self {
        Self {
            storage,
            inference,
            vault,
            app_state: AppStateManager::new(app_state_store),
            state: RwLock::new(SessionState::default()),
            autosave: Autosave::new(),
            debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
        }
    }

    /// Overrides the autosave debounce window (tests use short windows).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Returns one consistent read-only view of the whole session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let app_state = self.app_state.current().await;
        let s = self.state.read().await;
        SessionSnapshot {
            app_state,
            project: s.project.clone(),
            chapters: s.chapters.clone(),
            active_chapter: s.active_chapter.clone(),
            dirty: s.dirty(),
            preset: s.preset.clone(),
            preset_draft: s.preset_draft.clone(),
            llm_config: s.llm_config.clone(),
            models: s.models.clone(),
            summaries: s.summaries.clone(),
            sessions: s.sessions.clone(),
            active_session: s.active_session.clone(),
            ai_mode: s.ai_mode,
            generated: s.generated.as_ref().map(|p| p.response.clone()),
            busy: s.busy,
        }
    }

    pub async fn set_ai_mode(&self, mode: AiMode) {
        self.state.write().await.ai_mode = mode;
    }

    /// Cancels the debounce timer. Call on editor teardown so no save fires
    /// after the editing surface is gone.
    pub fn shutdown(&self) {
        self.autosave.cancel();
    }

    async fn set_busy<F: FnOnce(&mut BusyFlags)>(&self, mutate: F) {
        mutate(&mut self.state.write().await.busy);
    }

    async fn project_dir(&self) -> Option<String> {
        self.state
            .read()
            .await
            .project
            .as_ref()
            .map(|p| p.project_dir.clone())
    }

    // ------------------------------------------------------------------
    // Project loading
    // ------------------------------------------------------------------

    /// Restores the last open project on startup, falling back to the
    /// store's default project directory on first launch.
    pub async fn bootstrap(&self) -> Result<()> {
        let state = self.app_state.load().await;
        match state.last_project_dir().map(String::from) {
            Some(dir) => {
                self.load_all(&dir, RestoreTargets::from_app_state(&state))
                    .await
            }
            None => {
                let dir = self.app_state.default_project_dir().await?;
                let merged = self
                    .app_state
                    .update(|s| s.last_project_dir = Some(dir.clone()))
                    .await;
                self.load_all(&dir, RestoreTargets::from_app_state(&merged))
                    .await
            }
        }
    }

    /// Opens a project directory and restores the last-open chapter and
    /// session recorded for it.
    pub async fn open_project(&self, project_dir: &str) -> Result<()> {
        let merged = self
            .app_state
            .update(|s| s.last_project_dir = Some(project_dir.to_string()))
            .await;
        self.load_all(project_dir, RestoreTargets::from_app_state(&merged))
            .await
    }

    /// Re-runs the open procedure against the current project, preserving
    /// whichever chapter and session are already active.
    pub async fn reload_project(&self) -> Result<()> {
        let (dir, targets) = {
            let s = self.state.read().await;
            let Some(project) = &s.project else {
                return Ok(());
            };
            (
                project.project_dir.clone(),
                RestoreTargets {
                    chapter_id: s.active_chapter.as_ref().map(|c| c.id),
                    session_id: s.active_session.as_ref().map(|x| x.id.clone()),
                },
            )
        };
        self.load_all(&dir, targets).await
    }

    /// Runs the full load procedure and publishes the result atomically.
    ///
    /// On failure nothing is committed: the previously displayed project
    /// stays intact and only the loading flag is reset.
    async fn load_all(&self, project_dir: &str, targets: RestoreTargets) -> Result<()> {
        self.set_busy(|b| b.loading = true).await;
        self.autosave.cancel();

        match self.stage_project(project_dir, targets).await {
            Ok(staged) => {
                let mut s = self.state.write().await;
                s.project = Some(staged.project);
                s.chapters = staged.chapters;
                s.active_chapter = staged.active_chapter.clone();
                s.last_saved = staged.active_chapter;
                s.preset = Some(staged.preset);
                s.preset_draft = None;
                s.llm_config = Some(staged.llm_config);
                s.summaries = staged.summaries;
                s.sessions = staged.sessions;
                s.active_session = staged.active_session;
                s.generated = None;
                s.busy.loading = false;
                Ok(())
            }
            Err(e) => {
                self.set_busy(|b| b.loading = false).await;
                Err(e)
            }
        }
    }

    async fn stage_project(
        &self,
        project_dir: &str,
        targets: RestoreTargets,
    ) -> Result<StagedProject> {
        // Validation first: it may create on-disk structure the other reads
        // depend on.
        let project = self.storage.init_project(project_dir).await?;

        // The five per-project reads are independent; issue them together
        // to bound open latency. Any failure aborts the whole open.
        let (chapters, preset, llm_config, summaries, sessions) = tokio::try_join!(
            self.storage.list_chapters(project_dir),
            self.storage.load_preset(project_dir),
            self.storage.load_llm_config(project_dir),
            self.storage.load_summaries(project_dir),
            self.storage.list_sessions(project_dir),
        )?;

        let active_chapter = self
            .restore_chapter(project_dir, &chapters, targets.chapter_id)
            .await?;

        let active_session = match &targets.session_id {
            Some(id) => match self.storage.load_session(project_dir, id).await {
                Ok(session) => Some(session),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(session_id = %id, "last session is gone; opening without one");
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(StagedProject {
            project,
            chapters,
            active_chapter,
            preset,
            llm_config,
            summaries,
            sessions,
            active_session,
        })
    }

    /// Resolves and loads the chapter to restore: the desired id when it
    /// still exists, else the first index entry, else none. Dangling ids
    /// never fail the load.
    async fn restore_chapter(
        &self,
        project_dir: &str,
        chapters: &[ChapterIndexItem],
        desired: Option<u32>,
    ) -> Result<Option<Chapter>> {
        let fallback = chapters.first().map(|c| c.id).filter(|id| Some(*id) != desired);
        for id in [desired, fallback].into_iter().flatten() {
            match self.storage.load_chapter(project_dir, id).await {
                Ok(chapter) => return Ok(Some(chapter)),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(chapter_id = id, "chapter listed but not loadable; skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Chapter editing and autosave
    // ------------------------------------------------------------------

    /// Applies a keystroke burst to the in-memory buffer and (re)arms the
    /// debounce timer. The timer re-reads the buffer at fire time, so only
    /// the latest content of a burst is ever persisted.
    pub async fn update_chapter_content(self: &Arc<Self>, content: String) {
        let armed_chapter = {
            let mut s = self.state.write().await;
            let Some(chapter) = s.active_chapter.as_mut() else {
                return;
            };
            chapter.content = content;
            chapter.id
        };

        let this = Arc::clone(self);
        self.autosave.arm(self.debounce, move || async move {
            if let Err(e) = this.debounced_save(armed_chapter).await {
                tracing::warn!(chapter_id = armed_chapter, "autosave failed: {e}");
            }
        });
    }

    /// Debounce-triggered save. Skips silently when the active chapter
    /// changed since arming or the buffer is already clean (a navigation
    /// flush may have won the race; saves are idempotent either way).
    async fn debounced_save(&self, chapter_id: u32) -> Result<()> {
        {
            let s = self.state.read().await;
            match &s.active_chapter {
                Some(chapter) if chapter.id == chapter_id => {}
                _ => return Ok(()),
            }
            if !s.dirty() {
                return Ok(());
            }
        }
        self.save_chapter().await
    }

    /// Saves the active chapter verbatim.
    ///
    /// Idempotent: always persists whatever the buffer holds at call time.
    /// On success the last-saved snapshot advances, the navigation pointer
    /// is persisted, and the chapter index is refreshed from storage. On
    /// failure the dirty state is untouched and the error propagates.
    pub async fn save_chapter(&self) -> Result<()> {
        let (dir, chapter) = {
            let s = self.state.read().await;
            match (&s.project, &s.active_chapter) {
                (Some(project), Some(chapter)) => {
                    (project.project_dir.clone(), chapter.clone())
                }
                _ => return Ok(()),
            }
        };

        self.set_busy(|b| b.saving = true).await;
        let saved = self.storage.save_chapter(&dir, &chapter).await;
        self.set_busy(|b| b.saving = false).await;
        saved?;

        self.state.write().await.last_saved = Some(chapter.clone());

        self.app_state
            .update(|s| {
                s.last_project_dir = Some(dir.clone());
                s.last_chapter_id = Some(chapter.id);
            })
            .await;

        self.refresh_chapters(&dir).await
    }

    /// Switches the active chapter, flushing unsaved edits first.
    ///
    /// A pending generation result belonging to a different chapter is
    /// discarded after the swap; reselecting the chapter it targets keeps it.
    pub async fn select_chapter(&self, id: u32) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };

        self.autosave.cancel();
        if self.state.read().await.dirty() {
            self.save_chapter().await?;
        }

        let chapter = self.storage.load_chapter(&dir, id).await?;
        {
            let mut s = self.state.write().await;
            s.active_chapter = Some(chapter.clone());
            s.last_saved = Some(chapter);
            if s.generated.as_ref().is_some_and(|p| p.chapter_id != id) {
                s.generated = None;
            }
        }

        self.app_state
            .update(|s| {
                s.last_project_dir = Some(dir.clone());
                s.last_chapter_id = Some(id);
            })
            .await;
        Ok(())
    }

    /// Creates a chapter, refreshes the index from storage, and selects it.
    pub async fn create_chapter(&self, title: &str) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        let item = self.storage.create_chapter(&dir, title).await?;
        self.refresh_chapters(&dir).await?;
        self.select_chapter(item.id).await
    }

    /// Renames a chapter. The index is refreshed from storage; when the
    /// active chapter was renamed only its title is patched in memory, the
    /// content buffer is left alone.
    pub async fn rename_chapter(&self, id: u32, title: &str) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        self.storage.rename_chapter(&dir, id, title).await?;
        self.refresh_chapters(&dir).await?;

        let mut s = self.state.write().await;
        if let Some(chapter) = s.active_chapter.as_mut().filter(|c| c.id == id) {
            chapter.title = title.to_string();
        }
        if let Some(saved) = s.last_saved.as_mut().filter(|c| c.id == id) {
            saved.title = title.to_string();
        }
        Ok(())
    }

    /// Deletes a chapter and refreshes the index from storage. Deleting the
    /// active chapter selects the new first chapter, or clears the editor
    /// when none remain.
    pub async fn delete_chapter(&self, id: u32) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        self.storage.delete_chapter(&dir, id).await?;
        self.refresh_chapters(&dir).await?;

        let (was_active, next_id) = {
            let mut s = self.state.write().await;
            let was_active = s.active_chapter.as_ref().is_some_and(|c| c.id == id);
            if was_active {
                // Drop the buffer before any reselection so a dirty flush
                // cannot resurrect the deleted chapter.
                self.autosave.cancel();
                s.active_chapter = None;
                s.last_saved = None;
                s.generated = None;
            }
            (was_active, s.chapters.first().map(|c| c.id))
        };

        if was_active {
            if let Some(next) = next_id {
                self.select_chapter(next).await?;
            }
        }
        Ok(())
    }

    /// Reloads the chapter index from storage; the orchestrator never
    /// patches the index locally.
    async fn refresh_chapters(&self, dir: &str) -> Result<()> {
        let chapters = self.storage.list_chapters(dir).await?;
        self.state.write().await.chapters = chapters;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    /// Requests an AI continuation for the active chapter. The result is
    /// stored as pending and does not mutate the chapter until applied.
    ///
    /// A result that arrives after the user switched chapters is discarded;
    /// it was produced for a buffer that is no longer on screen.
    pub async fn continue_generate(&self, instruction: &str) -> Result<()> {
        let (dir, chapter_id) = {
            let s = self.state.read().await;
            match (&s.project, &s.active_chapter) {
                (Some(project), Some(chapter)) => (project.project_dir.clone(), chapter.id),
                _ => return Ok(()),
            }
        };

        self.set_busy(|b| b.generating = true).await;
        let result = self
            .inference
            .continue_chapter(&dir, chapter_id, instruction)
            .await;
        self.set_busy(|b| b.generating = false).await;
        let response = result?;

        let mut s = self.state.write().await;
        let still_active = s.active_chapter.as_ref().is_some_and(|c| c.id == chapter_id);
        if still_active {
            s.generated = Some(PendingGeneration {
                chapter_id,
                response,
            });
        } else {
            tracing::info!(
                chapter_id,
                "discarding generation result that arrived after a chapter switch"
            );
        }
        Ok(())
    }

    /// Applies the pending generation result to the active chapter and
    /// saves it directly (not debounced). When the generated summary is
    /// non-blank a summary record is appended and the log refreshed. The
    /// pending result is cleared on both apply variants.
    pub async fn apply_generated(&self, mode: ApplyMode) -> Result<()> {
        let (dir, chapter, generated) = {
            let mut s = self.state.write().await;
            let Some(dir) = s.project.as_ref().map(|p| p.project_dir.clone()) else {
                return Ok(());
            };
            let Some(active) = s.active_chapter.clone() else {
                return Ok(());
            };
            let Some(pending) = s.generated.clone() else {
                return Ok(());
            };
            if pending.chapter_id != active.id {
                // Stale leftovers from before a chapter switch; drop them.
                s.generated = None;
                return Ok(());
            }

            let mut next = active;
            next.content = match mode {
                ApplyMode::Append => append_generated(&next.content, &pending.response.content),
                ApplyMode::Replace => pending.response.content.clone(),
            };
            if !pending.response.summary.is_empty() {
                next.summary = pending.response.summary.clone();
            }
            s.active_chapter = Some(next.clone());
            (dir, next, pending.response)
        };

        self.storage.save_chapter(&dir, &chapter).await?;
        self.state.write().await.last_saved = Some(chapter.clone());

        if !generated.summary.trim().is_empty() {
            let record = SummaryRecord::new(&chapter, generated.summary.clone());
            self.storage.append_summary(&dir, &record).await?;
            let summaries = self.storage.load_summaries(&dir).await?;
            self.state.write().await.summaries = summaries;
        }

        self.state.write().await.generated = None;
        Ok(())
    }

    /// Drops the pending generation result without applying it.
    pub async fn discard_generated(&self) {
        self.state.write().await.generated = None;
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Returns the active session, creating one when none is active.
    ///
    /// Safe to call repeatedly: an existing active session is returned
    /// as-is, never duplicated.
    pub async fn ensure_session(&self) -> Result<ChatSession> {
        let dir = self
            .project_dir()
            .await
            .ok_or_else(|| QuillError::internal("no project open"))?;

        if let Some(session) = self.state.read().await.active_session.clone() {
            return Ok(session);
        }

        let created = self.storage.create_session(&dir, None).await?;
        // Load back for the canonical initial state rather than trusting
        // the index entry.
        let session = self.storage.load_session(&dir, &created.id).await?;
        self.state.write().await.active_session = Some(session.clone());
        self.refresh_sessions(&dir).await?;

        self.app_state
            .update(|s| {
                s.last_project_dir = Some(dir.clone());
                s.last_session_id = Some(session.id.clone());
            })
            .await;
        Ok(session)
    }

    /// Sends one chat turn.
    ///
    /// The user message is appended optimistically so the UI shows it
    /// before the round trip resolves; on success the whole session is
    /// replaced by the persisted log (which includes the assistant reply).
    /// On failure the optimistic message stays visible and the error
    /// propagates so the UI can surface it.
    pub async fn send_chat(&self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };

        self.set_busy(|b| b.chatting = true).await;
        let result = self.send_chat_inner(&dir, trimmed).await;
        self.set_busy(|b| b.chatting = false).await;
        result
    }

    async fn send_chat_inner(&self, dir: &str, text: &str) -> Result<()> {
        let session = self.ensure_session().await?;

        {
            let mut s = self.state.write().await;
            if let Some(active) = s.active_session.as_mut().filter(|a| a.id == session.id) {
                active.messages.push(ChatMessage::user(text));
            }
        }

        self.inference.discuss(dir, &session.id, text).await?;

        // The persisted log is authoritative; replace the optimistic copy
        // wholesale instead of merging.
        let refreshed = self.storage.load_session(dir, &session.id).await?;
        {
            let mut s = self.state.write().await;
            let still_active = s
                .active_session
                .as_ref()
                .is_some_and(|a| a.id == session.id);
            if still_active {
                s.active_session = Some(refreshed);
            } else {
                tracing::info!(
                    session_id = %session.id,
                    "chat reply arrived after a session switch; skipping reconciliation"
                );
            }
        }
        self.refresh_sessions(dir).await
    }

    /// Loads a session by id, makes it active and persists the pointer.
    pub async fn select_session(&self, session_id: &str) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        let session = self.storage.load_session(&dir, session_id).await?;
        self.state.write().await.active_session = Some(session);

        self.app_state
            .update(|s| {
                s.last_project_dir = Some(dir.clone());
                s.last_session_id = Some(session_id.to_string());
            })
            .await;
        Ok(())
    }

    /// Deletes a session. Only when the deleted session was active are the
    /// active session and the persisted pointer cleared.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        self.storage.delete_session(&dir, session_id).await?;
        self.refresh_sessions(&dir).await?;

        let was_active = {
            let mut s = self.state.write().await;
            let was_active = s
                .active_session
                .as_ref()
                .is_some_and(|a| a.id == session_id);
            if was_active {
                s.active_session = None;
            }
            was_active
        };
        if was_active {
            self.app_state.update(|s| s.last_session_id = None).await;
        }
        Ok(())
    }

    async fn refresh_sessions(&self, dir: &str) -> Result<()> {
        let sessions = self.storage.list_sessions(dir).await?;
        self.state.write().await.sessions = sessions;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Preset draft overlay
    // ------------------------------------------------------------------

    /// Starts (or restarts) a preset edit with a draft copy of the
    /// committed value.
    pub async fn begin_preset_edit(&self) {
        let mut s = self.state.write().await;
        s.preset_draft = Some(s.preset.clone().unwrap_or_else(Preset::default_for_writing));
    }

    /// Replaces the draft with the given value.
    pub async fn update_preset_draft(&self, draft: Preset) {
        self.state.write().await.preset_draft = Some(draft);
    }

    /// Drops the draft without committing.
    pub async fn discard_preset_draft(&self) {
        self.state.write().await.preset_draft = None;
    }

    /// Commits the draft: persist, replace the committed value, clear the
    /// overlay. A no-op when no edit is in progress.
    pub async fn save_preset(&self) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        let Some(draft) = self.state.read().await.preset_draft.clone() else {
            return Ok(());
        };

        self.storage.save_preset(&dir, &draft).await?;
        let mut s = self.state.write().await;
        s.preset = Some(draft);
        s.preset_draft = None;
        Ok(())
    }

    /// Exports the committed preset to a file outside the project.
    pub async fn export_preset(&self, path: &str) -> Result<()> {
        let preset = self
            .state
            .read()
            .await
            .preset
            .clone()
            .unwrap_or_else(Preset::default_for_writing);
        self.storage.export_preset(path, &preset).await
    }

    /// Imports a preset from a file, persisting it as the project preset.
    /// The committed value is replaced and any draft in progress is dropped.
    pub async fn import_preset(&self, path: &str) -> Result<()> {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        let preset = self.storage.import_preset(path).await?;
        self.storage.save_preset(&dir, &preset).await?;

        let mut s = self.state.write().await;
        s.preset = Some(preset);
        s.preset_draft = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // LLM configuration
    // ------------------------------------------------------------------

    /// Persists an edited config as a whole-object replace, repairing a
    /// dangling active endpoint id first.
    pub async fn save_llm_config(&self, config: LlmConfig) -> Result<()> {
        self.mutate_llm_config(move |current| {
            *current = config;
            Ok(())
        })
        .await
    }

    /// Adds an endpoint profile with a fresh id. The first endpoint added
    /// becomes active.
    pub async fn add_endpoint(
        &self,
        name: &str,
        base_url: &str,
        default_model: &str,
    ) -> Result<()> {
        let endpoint = EndpointConfig::new(name, base_url, default_model);
        self.mutate_llm_config(move |config| {
            if config.endpoints.is_empty() {
                config.active_endpoint_id = Some(endpoint.id.clone());
                config.active_model = Some(endpoint.default_model.clone());
            }
            config.endpoints.push(endpoint);
            Ok(())
        })
        .await
    }

    /// Removes an endpoint; the active pointer is cleared when it pointed
    /// at the removed entry, never left dangling.
    pub async fn remove_endpoint(&self, endpoint_id: &str) -> Result<()> {
        let id = endpoint_id.to_string();
        self.mutate_llm_config(move |config| {
            config.remove_endpoint(&id);
            Ok(())
        })
        .await
    }

    pub async fn set_active_endpoint(&self, endpoint_id: &str) -> Result<()> {
        let id = endpoint_id.to_string();
        self.mutate_llm_config(move |config| {
            if !config.endpoints.iter().any(|e| e.id == id) {
                return Err(QuillError::not_found("endpoint", &id));
            }
            config.active_endpoint_id = Some(id);
            Ok(())
        })
        .await
    }

    pub async fn set_active_model(&self, model: &str) -> Result<()> {
        let model = model.to_string();
        self.mutate_llm_config(move |config| {
            config.active_model = Some(model);
            Ok(())
        })
        .await
    }

    /// Replaces the generation knobs nested in one endpoint.
    pub async fn update_endpoint_parameters(
        &self,
        endpoint_id: &str,
        parameters: ModelParameters,
    ) -> Result<()> {
        let id = endpoint_id.to_string();
        self.mutate_llm_config(move |config| {
            let endpoint = config
                .endpoints
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| QuillError::not_found("endpoint", &id))?;
            endpoint.parameters = parameters;
            Ok(())
        })
        .await
    }

    /// Shared edit-repair-persist-publish path for every config mutation.
    async fn mutate_llm_config<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut LlmConfig) -> Result<()>,
    {
        let Some(dir) = self.project_dir().await else {
            return Ok(());
        };
        let mut config = self
            .state
            .read()
            .await
            .llm_config
            .clone()
            .unwrap_or_default();
        mutate(&mut config)?;
        config.repair_active_endpoint();

        self.storage.save_llm_config(&dir, &config).await?;
        self.state.write().await.llm_config = Some(config);
        Ok(())
    }

    /// Refreshes the model list from the active endpoint.
    ///
    /// Listing failures are tolerated: the previously known list stays and
    /// the error is only logged.
    pub async fn refresh_models(&self) -> Result<()> {
        let endpoint = {
            let s = self.state.read().await;
            s.llm_config
                .as_ref()
                .and_then(|c| c.active_endpoint().cloned())
        };
        let Some(endpoint) = endpoint else {
            return Ok(());
        };

        match self
            .inference
            .fetch_models(&endpoint.base_url, &endpoint.id)
            .await
        {
            Ok(models) => self.state.write().await.models = models,
            Err(e) => {
                tracing::warn!("model listing failed, keeping the previously known list: {e}");
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    pub async fn has_api_key(&self, endpoint_id: &str) -> Result<bool> {
        self.vault.has_key(endpoint_id).await
    }

    pub async fn set_api_key(&self, endpoint_id: &str, key: &str) -> Result<()> {
        self.vault.set_key(endpoint_id, key).await
    }

    pub async fn delete_api_key(&self, endpoint_id: &str) -> Result<()> {
        self.vault.delete_key(endpoint_id).await
    }
}

/// Joins existing content and a generated continuation, inserting a single
/// newline only when neither side already provides one.
fn append_generated(old: &str, generated: &str) -> String {
    if old.ends_with('\n') || generated.starts_with('\n') {
        format!("{old}{generated}")
    } else {
        format!("{old}\n{generated}")
    }
}

#[cfg(test)]
mod glue_tests {
    use super::append_generated;

    #[test]
    fn test_append_inserts_single_newline() {
        assert_eq!(append_generated("A", "B"), "A\nB");
        assert_eq!(append_generated("A\n", "B"), "A\nB");
        assert_eq!(append_generated("A", "\nB"), "A\nB");
        assert_eq!(append_generated("A\n", "\nB"), "A\n\nB");
    }
}
