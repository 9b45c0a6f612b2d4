use async_trait::async_trait;
use sprout_core::config::{Config, IntentConfig, LlmConfig};
use sprout_core::error::{Result, SproutError};
use sprout_core::types::{ChatMessage, ChatRequest, ChatResponse};
use sprout_llm::ollama::OllamaLlm;
use sprout_llm::openai::OpenAiLlm;
use sprout_llm::provider::LlmProvider;

/// Text completion over an ordered message list.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Provider selection for one model role.
#[derive(Debug, Clone)]
struct ModelSettings {
    provider: String,
    model: String,
    api_key: String,
    base_url: String,
}

impl From<&LlmConfig> for ModelSettings {
    fn from(c: &LlmConfig) -> Self {
        Self {
            provider: c.provider.clone(),
            model: c.model.clone(),
            api_key: c.api_key.clone(),
            base_url: c.base_url.clone(),
        }
    }
}

impl From<&IntentConfig> for ModelSettings {
    fn from(c: &IntentConfig) -> Self {
        Self {
            provider: c.provider.clone(),
            model: c.model.clone(),
            api_key: c.api_key.clone(),
            base_url: c.base_url.clone(),
        }
    }
}

/// Dispatches completions to the configured provider.
///
/// Providers are created per call from config, so the provider trait never
/// has to be object safe.
#[derive(Clone)]
pub struct LlmDispatch {
    settings: ModelSettings,
    ollama_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmDispatch {
    /// Model used for action classification.
    pub fn for_intent(config: &Config) -> Self {
        Self {
            settings: ModelSettings::from(&config.intent),
            ollama_url: config.ollama.base_url.clone(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }

    /// Model used for user-facing replies and routines.
    pub fn for_replies(config: &Config) -> Self {
        Self {
            settings: ModelSettings::from(&config.llm),
            ollama_url: config.ollama.base_url.clone(),
            max_tokens: 512,
            temperature: 0.7,
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let s = &self.settings;
        match s.provider.as_str() {
            "openai" | "groq" => {
                let provider =
                    OpenAiLlm::new(s.base_url.clone(), s.api_key.clone(), s.model.clone());
                call(&provider, request).await
            }
            "ollama" => {
                let provider = OllamaLlm::new(self.ollama_url.clone(), s.model.clone());
                call(&provider, request).await
            }
            other => Err(SproutError::Config(format!(
                "unknown LLM provider: '{other}'. Supported: openai, groq, ollama"
            ))),
        }
    }
}

/// One provider round trip, logged under the provider's own name.
async fn call<P: LlmProvider>(provider: &P, request: ChatRequest) -> Result<ChatResponse> {
    let name = provider.name();
    tracing::debug!(provider = name, messages = request.messages.len(), "calling llm");
    let response = provider.chat(request).await;
    match &response {
        Ok(r) => {
            if let Some(u) = &r.usage {
                tracing::debug!(
                    provider = name,
                    input_tokens = u.input_tokens,
                    output_tokens = u.output_tokens,
                    "llm usage"
                );
            }
        }
        Err(e) => tracing::warn!(provider = name, error = %e, "llm call failed"),
    }
    response
}

#[async_trait]
impl ChatModel for LlmDispatch {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!(model = %self.settings.model, "completing");

        let request = ChatRequest {
            messages: messages.to_vec(),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };
        let response = self.chat(request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::types::Usage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoProvider {
        name_reads: AtomicUsize,
    }

    impl LlmProvider for EchoProvider {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                content: request.messages.len().to_string(),
                usage: Some(Usage { input_tokens: 1, output_tokens: 1 }),
            })
        }

        fn name(&self) -> &str {
            self.name_reads.fetch_add(1, Ordering::SeqCst);
            "echo"
        }
    }

    #[tokio::test]
    async fn test_call_reads_provider_name_and_passes_response_through() {
        let provider = EchoProvider { name_reads: AtomicUsize::new(0) };
        let request = ChatRequest {
            messages: vec![ChatMessage::user("a"), ChatMessage::user("b")],
            max_tokens: None,
            temperature: None,
        };
        let response = call(&provider, request).await.unwrap();
        assert_eq!(response.content, "2");
        assert_eq!(provider.name_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_config_error() {
        let mut config = Config::default();
        config.llm.provider = "carrier-pigeon".to_string();
        let llm = LlmDispatch::for_replies(&config);
        let err = llm
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, SproutError::Config(_)));
    }

    #[test]
    fn test_roles_read_their_own_sections() {
        let mut config = Config::default();
        config.llm.model = "reply-model".to_string();
        config.intent.model = "intent-model".to_string();
        assert_eq!(LlmDispatch::for_replies(&config).settings.model, "reply-model");
        assert_eq!(LlmDispatch::for_intent(&config).settings.model, "intent-model");
    }
}
