//! Project identity model.

use serde::{Deserialize, Serialize};

/// Identity of the currently open project.
///
/// Replaced wholesale on every open/reload, never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Absolute project directory; the unique key for all storage calls.
    pub project_dir: String,
    /// Display name, derived from the directory basename.
    pub project_name: String,
}
