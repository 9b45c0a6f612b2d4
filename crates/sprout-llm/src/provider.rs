use sprout_core::error::Result;
use sprout_core::types::{ChatRequest, ChatResponse};

/// Trait for LLM chat completion providers.
pub trait LlmProvider: Send + Sync {
    /// Send a chat request and receive a completion response.
    fn chat(&self, request: ChatRequest) -> impl std::future::Future<Output = Result<ChatResponse>> + Send;

    /// Return the provider name (e.g. "openai", "ollama").
    fn name(&self) -> &str;
}
