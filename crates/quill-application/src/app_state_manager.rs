//! Persisted app state manager.
//!
//! Owns the in-memory copy of the cross-restart "last opened" record and
//! funnels every mutation through a single merge-and-persist operation, so
//! concurrent navigation intents never partially overwrite each other's
//! unrelated fields.

use quill_core::{AppState, AppStateStore, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tolerant wrapper around the app state store.
///
/// Persistence is best-effort: a failed write is logged and swallowed, and
/// the in-memory copy still advances, so navigation keeps working for the
/// rest of the process lifetime.
pub struct AppStateManager {
    store: Arc<dyn AppStateStore>,
    state: RwLock<AppState>,
}

impl AppStateManager {
    pub fn new(store: Arc<dyn AppStateStore>) -> Self {
        Self {
            store,
            state: RwLock::new(AppState::default()),
        }
    }

    /// Loads the persisted record, falling back to first-launch defaults on
    /// any store failure.
    pub async fn load(&self) -> AppState {
        let loaded = match self.store.load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("failed to load app state, starting from defaults: {e}");
                AppState::default()
            }
        };
        *self.state.write().await = loaded.clone();
        loaded
    }

    /// Returns the current in-memory record.
    pub async fn current(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// The single merge-and-persist funnel.
    ///
    /// `mutate` edits only the fields it cares about; everything else is
    /// carried over from the previous value. Returns the merged record.
    pub async fn update<F>(&self, mutate: F) -> AppState
    where
        F: FnOnce(&mut AppState),
    {
        let next = {
            let mut guard = self.state.write().await;
            mutate(&mut guard);
            guard.clone()
        };
        if let Err(e) = self.store.persist(&next).await {
            tracing::warn!("failed to persist app state (keeping in-memory copy): {e}");
        }
        next
    }

    /// Directory to open when no project was ever opened.
    pub async fn default_project_dir(&self) -> Result<String> {
        self.store.default_project_dir().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_core::QuillError;
    use std::sync::Mutex;

    struct FlakyStore {
        persisted: Mutex<Option<AppState>>,
        fail_persist: Mutex<bool>,
        fail_load: bool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                persisted: Mutex::new(None),
                fail_persist: Mutex::new(false),
                fail_load: false,
            }
        }
    }

    #[async_trait]
    impl AppStateStore for FlakyStore {
        async fn load(&self) -> Result<AppState> {
            if self.fail_load {
                return Err(QuillError::io("unreadable"));
            }
            Ok(self.persisted.lock().unwrap().clone().unwrap_or_default())
        }

        async fn persist(&self, state: &AppState) -> Result<()> {
            if *self.fail_persist.lock().unwrap() {
                return Err(QuillError::io("disk full"));
            }
            *self.persisted.lock().unwrap() = Some(state.clone());
            Ok(())
        }

        async fn default_project_dir(&self) -> Result<String> {
            Ok("/tmp/default".to_string())
        }
    }

    #[tokio::test]
    async fn test_updates_merge_unrelated_fields() {
        let manager = AppStateManager::new(Arc::new(FlakyStore::new()));
        manager.load().await;

        manager
            .update(|s| s.last_project_dir = Some("/p".to_string()))
            .await;
        manager.update(|s| s.last_chapter_id = Some(3)).await;
        let merged = manager
            .update(|s| s.last_session_id = Some("sess".to_string()))
            .await;

        assert_eq!(merged.last_project_dir.as_deref(), Some("/p"));
        assert_eq!(merged.last_chapter_id, Some(3));
        assert_eq!(merged.last_session_id.as_deref(), Some("sess"));
    }

    #[tokio::test]
    async fn test_persist_failure_still_advances_memory() {
        let store = Arc::new(FlakyStore::new());
        let manager = AppStateManager::new(store.clone());
        manager.load().await;

        *store.fail_persist.lock().unwrap() = true;
        manager.update(|s| s.last_chapter_id = Some(7)).await;

        assert_eq!(manager.current().await.last_chapter_id, Some(7));
        assert!(store.persisted.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_defaults() {
        let store = Arc::new(FlakyStore {
            fail_load: true,
            ..FlakyStore::new()
        });
        let manager = AppStateManager::new(store);
        assert_eq!(manager.load().await, AppState::default());
    }
}
