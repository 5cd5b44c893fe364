//! Application layer: the session orchestrator and its supporting parts.
//!
//! Everything here is presentation-agnostic. A UI shell calls intents on
//! [`SessionOrchestrator`] and renders the [`SessionSnapshot`] it publishes;
//! persistence, credentials and inference arrive as trait objects from the
//! infrastructure layer.

pub mod app_state_manager;
pub mod autosave;
pub mod orchestrator;
pub mod snapshot;

pub use app_state_manager::AppStateManager;
pub use autosave::Autosave;
pub use orchestrator::{ApplyMode, DEFAULT_AUTOSAVE_DEBOUNCE, SessionOrchestrator};
pub use snapshot::{AiMode, BusyFlags, SessionSnapshot};

#[cfg(test)]
mod orchestrator_e2e_test;
