//! Inference client trait.
//!
//! Defines the interface to the LLM provider. Calls are opaque remote
//! operations; the orchestrator only sees their results.

use crate::chat::ChatMessage;
use crate::error::Result;
use crate::generation::GenerationResponse;
use async_trait::async_trait;

/// Client for model listing, chapter continuation and chat completion.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Lists the model ids reachable at `base_url`, sorted.
    async fn fetch_models(&self, base_url: &str, endpoint_id: &str) -> Result<Vec<String>>;

    /// Generates a continuation for the chapter, guided by a free-text
    /// instruction. Does not mutate the chapter.
    async fn continue_chapter(
        &self,
        project_dir: &str,
        chapter_id: u32,
        instruction: &str,
    ) -> Result<GenerationResponse>;

    /// Runs one chat round trip for the session and returns the assistant's
    /// reply. The persisted session log is the authoritative record; the
    /// orchestrator reloads it afterwards rather than trusting this value.
    async fn discuss(
        &self,
        project_dir: &str,
        session_id: &str,
        user_message: &str,
    ) -> Result<ChatMessage>;
}
