//! LLM endpoint configuration models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generation knobs for one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

impl ModelParameters {
    /// Defaults tuned for long-form prose generation.
    pub fn default_for_writing() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 4000,
            top_p: None,
            top_k: None,
        }
    }
}

/// One LLM provider profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub default_model: String,
    #[serde(default)]
    pub parameters: ModelParameters,
}

impl EndpointConfig {
    /// Creates an endpoint profile with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            base_url: base_url.into(),
            default_model: default_model.into(),
            parameters: ModelParameters::default_for_writing(),
        }
    }
}

/// Set of reachable model endpoints, persisted as a whole-object replace.
///
/// Invariant: `active_endpoint_id`, when present, resolves to an entry in
/// `endpoints`. [`LlmConfig::remove_endpoint`] and
/// [`LlmConfig::repair_active_endpoint`] uphold it after mutations.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
    pub active_endpoint_id: Option<String>,
    pub active_model: Option<String>,
}

impl LlmConfig {
    /// Resolves the endpoint to use for inference calls.
    ///
    /// Prefers the configured active endpoint, falling back to the first
    /// entry when the id is unset or does not resolve.
    pub fn active_endpoint(&self) -> Option<&EndpointConfig> {
        if let Some(id) = &self.active_endpoint_id {
            if let Some(ep) = self.endpoints.iter().find(|e| &e.id == id) {
                return Some(ep);
            }
        }
        self.endpoints.first()
    }

    /// Resolves the model name to use with `endpoint`.
    ///
    /// A non-blank `active_model` overrides the endpoint default.
    pub fn resolved_model(&self, endpoint: &EndpointConfig) -> String {
        self.active_model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| endpoint.default_model.clone())
    }

    /// Removes an endpoint by id, clearing `active_endpoint_id` when it
    /// pointed at the removed entry.
    pub fn remove_endpoint(&mut self, id: &str) {
        self.endpoints.retain(|e| e.id != id);
        if self.active_endpoint_id.as_deref() == Some(id) {
            self.active_endpoint_id = None;
        }
    }

    /// Clears `active_endpoint_id` if it no longer resolves to an entry.
    pub fn repair_active_endpoint(&mut self) {
        if let Some(id) = &self.active_endpoint_id {
            if !self.endpoints.iter().any(|e| &e.id == id) {
                self.active_endpoint_id = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_two_endpoints() -> (LlmConfig, String, String) {
        let a = EndpointConfig::new("A", "https://a.example/v1", "model-a");
        let b = EndpointConfig::new("B", "https://b.example/v1", "model-b");
        let (id_a, id_b) = (a.id.clone(), b.id.clone());
        let cfg = LlmConfig {
            endpoints: vec![a, b],
            active_endpoint_id: Some(id_b.clone()),
            active_model: None,
        };
        (cfg, id_a, id_b)
    }

    #[test]
    fn test_remove_active_endpoint_clears_pointer() {
        let (mut cfg, _, id_b) = config_with_two_endpoints();
        cfg.remove_endpoint(&id_b);
        assert_eq!(cfg.endpoints.len(), 1);
        assert!(cfg.active_endpoint_id.is_none());
    }

    #[test]
    fn test_remove_other_endpoint_keeps_pointer() {
        let (mut cfg, id_a, id_b) = config_with_two_endpoints();
        cfg.remove_endpoint(&id_a);
        assert_eq!(cfg.active_endpoint_id, Some(id_b));
    }

    #[test]
    fn test_active_endpoint_falls_back_to_first() {
        let (mut cfg, id_a, _) = config_with_two_endpoints();
        cfg.active_endpoint_id = Some("dangling".to_string());
        assert_eq!(cfg.active_endpoint().unwrap().id, id_a);

        cfg.repair_active_endpoint();
        assert!(cfg.active_endpoint_id.is_none());
    }

    #[test]
    fn test_resolved_model_prefers_non_blank_active_model() {
        let (mut cfg, _, _) = config_with_two_endpoints();
        let ep = cfg.endpoints[0].clone();
        assert_eq!(cfg.resolved_model(&ep), "model-a");

        cfg.active_model = Some("  ".to_string());
        assert_eq!(cfg.resolved_model(&ep), "model-a");

        cfg.active_model = Some("custom".to_string());
        assert_eq!(cfg.resolved_model(&ep), "custom");
    }
}
