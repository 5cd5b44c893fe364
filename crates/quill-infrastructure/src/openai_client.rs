//! OpenAI-compatible inference client.
//!
//! Implements the inference collaborator against any endpoint exposing the
//! `/models` and `/chat/completions` surface. Reads project context (preset,
//! summary log, chapter, session) through the storage collaborator so the
//! orchestrator only ever passes ids.

use crate::prompt::{self, Task};
use async_trait::async_trait;
use quill_core::chat::DEFAULT_SESSION_TITLE;
use quill_core::{
    ChatMessage, CredentialVault, GenerationResponse, InferenceClient, LlmConfig, ModelParameters,
    ProjectStorage, QuillError, Result,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::Arc;

/// How many summary-log entries are carried as story context.
const MAX_CONTEXT_SUMMARIES: usize = 20;

#[derive(serde::Deserialize)]
struct ModelsResponse {
    data: Vec<ModelItem>,
}

#[derive(serde::Deserialize)]
struct ModelItem {
    id: String,
}

/// Inference client for OpenAI-compatible providers.
pub struct OpenAiClient {
    storage: Arc<dyn ProjectStorage>,
    vault: Arc<dyn CredentialVault>,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(storage: Arc<dyn ProjectStorage>, vault: Arc<dyn CredentialVault>) -> Self {
        Self {
            storage,
            vault,
            http: reqwest::Client::new(),
        }
    }

    fn headers(api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| QuillError::credential("API key is not a valid header value"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Resolves the active endpoint, model and API key for a project.
    async fn resolve_endpoint(
        &self,
        config: &LlmConfig,
    ) -> Result<(quill_core::EndpointConfig, String, String)> {
        let endpoint = config
            .active_endpoint()
            .cloned()
            .ok_or_else(|| QuillError::config("no LLM endpoint configured"))?;
        let model = config.resolved_model(&endpoint);
        let api_key = self
            .vault
            .get_key(&endpoint.id)
            .await
            .map_err(|_| QuillError::config("no API key set for the active endpoint"))?;
        Ok((endpoint, model, api_key))
    }

    async fn post_chat_completions(
        &self,
        base_url: &str,
        api_key: &str,
        model: &str,
        params: &ModelParameters,
        messages: Vec<Value>,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", normalize_base_url(base_url));
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });
        if let Some(top_p) = params.top_p {
            if top_p < 1.0 {
                body["top_p"] = serde_json::json!(top_p);
            }
        }
        if let Some(top_k) = params.top_k {
            if top_k > 0 {
                body["top_k"] = serde_json::json!(top_k);
            }
        }

        let res = self
            .http
            .post(url)
            .headers(Self::headers(api_key)?)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuillError::inference(format!(
                "chat completion failed: {status} {body}"
            )));
        }

        let v: Value = res.json().await?;
        let content = v
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c0| c0.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                QuillError::inference("response is missing choices[0].message.content")
            })?;
        Ok(content.to_string())
    }
}

#[async_trait]
impl InferenceClient for OpenAiClient {
    async fn fetch_models(&self, base_url: &str, endpoint_id: &str) -> Result<Vec<String>> {
        let api_key = self.vault.get_key(endpoint_id).await?;
        let url = format!("{}/models", normalize_base_url(base_url));
        let res = self
            .http
            .get(url)
            .headers(Self::headers(&api_key)?)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuillError::inference(format!(
                "model listing failed: {status} {body}"
            )));
        }

        let parsed: ModelsResponse = res.json().await?;
        let mut models = parsed.data.into_iter().map(|m| m.id).collect::<Vec<_>>();
        models.sort();
        Ok(models)
    }

    async fn continue_chapter(
        &self,
        project_dir: &str,
        chapter_id: u32,
        instruction: &str,
    ) -> Result<GenerationResponse> {
        let preset = self.storage.load_preset(project_dir).await?;
        let config = self.storage.load_llm_config(project_dir).await?;
        let (endpoint, model, api_key) = self.resolve_endpoint(&config).await?;

        let chapter = self.storage.load_chapter(project_dir, chapter_id).await?;
        let summaries = self.storage.load_summaries(project_dir).await?;
        let mut context = summaries
            .into_iter()
            .filter(|s| !s.summary.trim().is_empty())
            .rev()
            .take(MAX_CONTEXT_SUMMARIES)
            .map(|s| (s.chapter_title, s.summary))
            .collect::<Vec<_>>();
        context.reverse();

        let system = prompt::build_system_prompt(&preset, Task::Continue);
        let user = prompt::build_user_prompt(&context, &chapter.content, Task::Continue, instruction);
        let messages = vec![
            serde_json::json!({ "role": "system", "content": system }),
            serde_json::json!({ "role": "user", "content": user }),
        ];

        let raw = self
            .post_chat_completions(&endpoint.base_url, &api_key, &model, &endpoint.parameters, messages)
            .await?;
        Ok(parse_generation(&raw))
    }

    async fn discuss(
        &self,
        project_dir: &str,
        session_id: &str,
        user_message: &str,
    ) -> Result<ChatMessage> {
        let preset = self.storage.load_preset(project_dir).await?;
        let config = self.storage.load_llm_config(project_dir).await?;
        let (endpoint, model, api_key) = self.resolve_endpoint(&config).await?;

        let mut session = self.storage.load_session(project_dir, session_id).await?;
        let system = prompt::build_system_prompt(&preset, Task::Discuss);

        session.messages.push(ChatMessage::user(user_message));

        // Everything before the turn we just appended is history.
        let history_len = session.messages.len().saturating_sub(1);
        let messages = prompt::to_openai_messages(
            system,
            &session.messages[..history_len],
            user_message.to_string(),
        );

        let raw = self
            .post_chat_completions(&endpoint.base_url, &api_key, &model, &endpoint.parameters, messages)
            .await?;
        let assistant = ChatMessage::assistant(raw);
        session.messages.push(assistant.clone());

        // First user message names an untitled session.
        if session.title.trim().is_empty() || session.title == DEFAULT_SESSION_TITLE {
            let trimmed = user_message.trim();
            if !trimmed.is_empty() {
                session.title = trimmed.chars().take(16).collect();
            }
        }

        self.storage.save_session(project_dir, &session).await?;
        Ok(assistant)
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Pulls the contents of a fenced ```json block, if any.
fn extract_json_block(raw: &str) -> Option<String> {
    let start = raw.find("```json")?;
    let after = &raw[start + "```json".len()..];
    let end = after.find("```")?;
    Some(after[..end].trim().to_string())
}

/// Parses a continuation reply into content + summary.
///
/// Models are asked for JSON but do not always comply; a reply that fails to
/// parse becomes plain content with the raw text preserved for diagnostics.
fn parse_generation(raw: &str) -> GenerationResponse {
    let candidate = extract_json_block(raw).unwrap_or_else(|| raw.trim().to_string());
    match serde_json::from_str::<Value>(&candidate) {
        Ok(v) => GenerationResponse {
            content: v
                .get("content")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .to_string(),
            summary: v
                .get("summary")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .to_string(),
            raw: None,
        },
        Err(_) => GenerationResponse {
            content: raw.to_string(),
            summary: String::new(),
            raw: Some(raw.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(normalize_base_url("https://x/v1/"), "https://x/v1");
        assert_eq!(normalize_base_url("https://x/v1"), "https://x/v1");
    }

    #[test]
    fn test_parse_generation_fenced_json() {
        let raw = "noise\n```json\n{\"content\": \"prose\", \"summary\": \"sum\"}\n```";
        let parsed = parse_generation(raw);
        assert_eq!(parsed.content, "prose");
        assert_eq!(parsed.summary, "sum");
        assert!(parsed.raw.is_none());
    }

    #[test]
    fn test_parse_generation_bare_json() {
        let parsed = parse_generation("{\"content\": \"p\", \"summary\": \"\"}");
        assert_eq!(parsed.content, "p");
        assert_eq!(parsed.summary, "");
    }

    #[test]
    fn test_parse_generation_falls_back_to_raw_text() {
        let parsed = parse_generation("just prose, no JSON");
        assert_eq!(parsed.content, "just prose, no JSON");
        assert_eq!(parsed.summary, "");
        assert_eq!(parsed.raw.as_deref(), Some("just prose, no JSON"));
    }
}
