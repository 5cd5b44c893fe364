//! Core domain models and collaborator traits for Quill.
//!
//! This crate holds everything the session orchestrator shares with the
//! storage, credential and inference layers: the persisted entity models,
//! the error type, and the `async_trait` contracts the infrastructure crate
//! implements.

pub mod app_state;
pub mod chapter;
pub mod chat;
pub mod error;
pub mod generation;
pub mod inference;
pub mod llm_config;
pub mod preset;
pub mod project;
pub mod secret;
pub mod storage;
pub mod summary;

// Re-export the common error type and result alias.
pub use error::{QuillError, Result};

pub use app_state::AppState;
pub use chapter::{Chapter, ChapterIndexItem};
pub use chat::{ChatMessage, ChatRole, ChatSession, ChatSessionIndexItem, DEFAULT_SESSION_TITLE};
pub use generation::GenerationResponse;
pub use inference::InferenceClient;
pub use llm_config::{EndpointConfig, LlmConfig, ModelParameters};
pub use preset::Preset;
pub use project::ProjectInfo;
pub use secret::CredentialVault;
pub use storage::{AppStateStore, ProjectStorage};
pub use summary::SummaryRecord;
