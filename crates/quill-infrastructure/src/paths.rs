//! Project directory layout.
//!
//! Centralizes every path inside a project directory so the storage
//! implementation never builds paths ad hoc.
//!
//! ```text
//! <project_dir>/
//! ├── chapters/
//! │   ├── index.json
//! │   ├── chapter_001.txt
//! │   └── chapter_001.json
//! ├── chat_sessions/
//! │   ├── index.json
//! │   └── session_<uuid>.json
//! ├── config.json        (preset)
//! ├── llm_config.json
//! └── summaries.json
//! ```

use std::path::{Path, PathBuf};

/// Path helper for one project directory.
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(project_dir: &str) -> Self {
        Self {
            root: PathBuf::from(project_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chapters_dir(&self) -> PathBuf {
        self.root.join("chapters")
    }

    pub fn chapters_index(&self) -> PathBuf {
        self.chapters_dir().join("index.json")
    }

    pub fn chapter_body(&self, id: u32) -> PathBuf {
        self.chapters_dir().join(format!("chapter_{id:03}.txt"))
    }

    pub fn chapter_meta(&self, id: u32) -> PathBuf {
        self.chapters_dir().join(format!("chapter_{id:03}.json"))
    }

    pub fn preset_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn llm_config_file(&self) -> PathBuf {
        self.root.join("llm_config.json")
    }

    pub fn summaries_file(&self) -> PathBuf {
        self.root.join("summaries.json")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("chat_sessions")
    }

    pub fn sessions_index(&self) -> PathBuf {
        self.sessions_dir().join("index.json")
    }

    pub fn session_file(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(format!("session_{session_id}.json"))
    }

    /// Display name for the project, derived from the directory basename.
    pub fn project_name(&self) -> String {
        self.root
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Project".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = ProjectPaths::new("/tmp/my-novel");
        assert!(paths.chapter_body(7).ends_with("chapters/chapter_007.txt"));
        assert!(paths.chapter_meta(12).ends_with("chapters/chapter_012.json"));
        assert!(paths.session_file("abc").ends_with("chat_sessions/session_abc.json"));
        assert_eq!(paths.project_name(), "my-novel");
    }
}
