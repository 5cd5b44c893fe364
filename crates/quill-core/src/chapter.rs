//! Chapter domain models.

use serde::{Deserialize, Serialize};

/// Lightweight chapter listing entry.
///
/// Produced by the storage collaborator; the orchestrator never constructs
/// these directly, it only refreshes the list after a mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterIndexItem {
    pub id: u32,
    pub title: String,
}

/// Full editable chapter document.
///
/// At most one chapter is active at a time; its in-memory `content` is the
/// source of truth until the next successful save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: u32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: String,
}

impl Chapter {
    /// Creates an empty chapter with the given id and title.
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            summary: String::new(),
        }
    }
}
