//! AI continuation result model.

use serde::{Deserialize, Serialize};

/// Ephemeral AI continuation result.
///
/// Produced by the inference collaborator; lives only in orchestrator memory
/// until applied to a chapter or discarded. Never persisted itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub content: String,
    pub summary: String,
    /// Raw model output, kept only when structured parsing failed.
    #[serde(default)]
    pub raw: Option<String>,
}
