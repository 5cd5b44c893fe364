//! Style preset domain model.

use serde::{Deserialize, Serialize};

/// Writing style configuration for a project.
///
/// Loaded once per project and edited through a draft overlay in the UI;
/// only an explicit save commits a new value. Rule order is meaningful and
/// user-visible.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub style: String,
    pub pov: String,
    pub rules: Vec<String>,
}

impl Preset {
    /// The preset seeded into a freshly initialized project.
    pub fn default_for_writing() -> Self {
        Self {
            style: "Vivid, immersive, strong sense of place".to_string(),
            pov: "Third person limited".to_string(),
            rules: vec![
                "Keep the prose style consistent".to_string(),
                "Favor concrete sensory detail".to_string(),
                "Avoid an omniscient narrator".to_string(),
                "Show emotion through action and detail".to_string(),
            ],
        }
    }
}
