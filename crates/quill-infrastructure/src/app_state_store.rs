//! App state store implementation.
//!
//! Persists the process-wide "last opened" record as a JSON file under the
//! per-user application data directory.

use crate::json_store::{read_json_or, write_json_atomic};
use async_trait::async_trait;
use quill_core::{AppState, AppStateStore, QuillError, Result};
use std::path::{Path, PathBuf};

/// File-backed app state store.
///
/// Lives at `<data_dir>/quill/app_state.json`. A custom base directory can
/// be supplied for tests.
pub struct FileAppStateStore {
    base_dir: PathBuf,
}

impl FileAppStateStore {
    /// Creates a store rooted at the default per-user data directory.
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| QuillError::config("no application data directory available"))?
            .join("quill");
        Ok(Self::new(&base))
    }

    /// Creates a store rooted at `base_dir` (for testing).
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }

    fn state_file(&self) -> PathBuf {
        self.base_dir.join("app_state.json")
    }
}

#[async_trait]
impl AppStateStore for FileAppStateStore {
    async fn load(&self) -> Result<AppState> {
        // A missing file is first launch, not an error. Anything else (a
        // corrupt or unreadable file) propagates; the orchestrator decides
        // how tolerant to be.
        read_json_or(&self.state_file(), AppState::default).await
    }

    async fn persist(&self, state: &AppState) -> Result<()> {
        write_json_atomic(&self.state_file(), state).await
    }

    async fn default_project_dir(&self) -> Result<String> {
        Ok(self.base_dir.join("MyNovel").to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let store = FileAppStateStore::new(dir.path());
        assert_eq!(store.load().await.unwrap(), AppState::default());
    }

    #[tokio::test]
    async fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileAppStateStore::new(dir.path());

        let state = AppState {
            last_project_dir: Some("/tmp/novel".to_string()),
            last_chapter_id: Some(2),
            last_session_id: Some("abc".to_string()),
        };
        store.persist(&state).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_default_project_dir_is_under_base() {
        let dir = TempDir::new().unwrap();
        let store = FileAppStateStore::new(dir.path());
        let default = store.default_project_dir().await.unwrap();
        assert!(default.ends_with("MyNovel"));
    }
}
