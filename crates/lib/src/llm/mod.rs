//! LLM abstraction and OpenAI-compatible chat-completions client.
//!
//! The relay only needs one capability: send a system instruction plus one user turn and get text back.

mod openai;

use async_trait::async_trait;

pub use openai::{ChatMessage, ChatResponse, OpenAiClient};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("model api error: {0}")]
    Api(String),
    #[error("model api key not configured")]
    MissingApiKey,
}

/// A hosted language model that answers one user message under a system instruction.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Returns the assistant's reply text. Transport, status and quota failures surface as errors.
    async fn invoke(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;
}
