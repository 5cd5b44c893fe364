//! Read-only session snapshot.
//!
//! The orchestrator republishes one consistent snapshot after every intent;
//! the presentation layer renders it and never mutates state directly.

use quill_core::{
    AppState, Chapter, ChapterIndexItem, ChatSession, ChatSessionIndexItem, GenerationResponse,
    LlmConfig, Preset, ProjectInfo, SummaryRecord,
};
use serde::{Deserialize, Serialize};

/// Which AI surface the user is working with.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    #[default]
    Continue,
    Discuss,
}

/// Independent busy indicators.
///
/// Deliberately not a single enum: saving and generating can overlap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BusyFlags {
    pub loading: bool,
    pub saving: bool,
    pub generating: bool,
    pub chatting: bool,
}

/// One consistent view of the whole session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub app_state: AppState,
    pub project: Option<ProjectInfo>,
    pub chapters: Vec<ChapterIndexItem>,
    pub active_chapter: Option<Chapter>,
    /// Active chapter content differs from the last successfully saved copy.
    pub dirty: bool,
    pub preset: Option<Preset>,
    /// Uncommitted preset edits; `None` when no edit is in progress.
    pub preset_draft: Option<Preset>,
    pub llm_config: Option<LlmConfig>,
    /// Model ids from the last successful listing.
    pub models: Vec<String>,
    pub summaries: Vec<SummaryRecord>,
    pub sessions: Vec<ChatSessionIndexItem>,
    pub active_session: Option<ChatSession>,
    pub ai_mode: AiMode,
    /// Pending, unapplied continuation result.
    pub generated: Option<GenerationResponse>,
    pub busy: BusyFlags,
}
