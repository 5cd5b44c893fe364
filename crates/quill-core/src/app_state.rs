//! Application state domain model.
//!
//! Contains the cross-restart pointer to "what was open": project directory,
//! chapter and chat session.

use serde::{Deserialize, Serialize};

/// Application state that persists across restarts.
///
/// Every field is optional: a fresh install has none of them, and a pointer
/// may go dangling when the entity it refers to is deleted out-of-band. The
/// orchestrator tolerates dangling pointers on load.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Directory of the last opened project.
    pub last_project_dir: Option<String>,
    /// Id of the chapter that was active when the app last persisted state.
    pub last_chapter_id: Option<u32>,
    /// Id of the chat session that was active when the app last persisted state.
    pub last_session_id: Option<String>,
}

impl AppState {
    /// Creates an empty AppState (first-launch defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last project directory, trimmed, if it is non-empty.
    pub fn last_project_dir(&self) -> Option<&str> {
        self.last_project_dir
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_project_dir_is_none() {
        let state = AppState {
            last_project_dir: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(state.last_project_dir().is_none());

        let state = AppState {
            last_project_dir: Some("/tmp/novel".to_string()),
            ..Default::default()
        };
        assert_eq!(state.last_project_dir(), Some("/tmp/novel"));
    }

    #[test]
    fn test_camel_case_serialization() {
        let state = AppState {
            last_project_dir: Some("/tmp/novel".to_string()),
            last_chapter_id: Some(3),
            last_session_id: None,
        };
        let raw = serde_json::to_string(&state).unwrap();
        assert!(raw.contains("lastProjectDir"));
        assert!(raw.contains("lastChapterId"));
    }
}
