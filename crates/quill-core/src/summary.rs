//! Summary log domain model.

use crate::chapter::Chapter;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only log entry recording a chapter summary.
///
/// Created only as a side effect of applying a generation result whose
/// summary is non-blank; never mutated or deleted by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub id: String,
    pub chapter_id: u32,
    pub chapter_title: String,
    pub summary: String,
    /// RFC3339 timestamp; sortable as a string.
    pub created_at: String,
}

impl SummaryRecord {
    /// Creates a record for `chapter` with a fresh id and the current time.
    pub fn new(chapter: &Chapter, summary: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chapter_id: chapter.id,
            chapter_title: chapter.title.clone(),
            summary: summary.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_carries_chapter_identity() {
        let chapter = Chapter::new(7, "The Crossing");
        let record = SummaryRecord::new(&chapter, "They cross the river.");
        assert_eq!(record.chapter_id, 7);
        assert_eq!(record.chapter_title, "The Crossing");
        assert!(!record.id.is_empty());
        assert!(!record.created_at.is_empty());
    }
}
