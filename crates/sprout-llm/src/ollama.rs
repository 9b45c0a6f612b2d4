use reqwest::Client;
use serde_json::json;
use sprout_core::error::{Result, SproutError};
use sprout_core::types::{ChatRequest, ChatResponse, Usage};

use crate::provider::LlmProvider;

/// Chat provider for a local Ollama server.
pub struct OllamaLlm {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaLlm {
    /// # Arguments
    /// * `base_url` - Ollama server URL (e.g. "http://localhost:11434")
    /// * `model` - Model tag (e.g. "deepseek-r1:7b")
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn error(message: String) -> SproutError {
        SproutError::Llm {
            provider: "ollama".to_string(),
            message,
        }
    }
}

/// Non-streaming `/api/chat` body. Sampling knobs live under `options`;
/// `max_tokens` maps to `num_predict`.
fn request_body(model: &str, request: &ChatRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    let mut options = serde_json::Map::new();
    if let Some(temp) = request.temperature {
        options.insert("temperature".to_string(), json!(temp));
    }
    if let Some(max_tokens) = request.max_tokens {
        options.insert("num_predict".to_string(), json!(max_tokens));
    }

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });
    if !options.is_empty() {
        body["options"] = serde_json::Value::Object(options);
    }
    body
}

fn parse_response(parsed: &serde_json::Value) -> Result<ChatResponse> {
    let content = parsed["message"]["content"]
        .as_str()
        .ok_or_else(|| OllamaLlm::error("missing message.content in response".to_string()))?
        .to_string();

    // absent when the prompt was served from cache
    let usage = match (
        parsed["prompt_eval_count"].as_u64(),
        parsed["eval_count"].as_u64(),
    ) {
        (Some(input), Some(output)) => Some(Usage {
            input_tokens: input as u32,
            output_tokens: output as u32,
        }),
        _ => None,
    };

    Ok(ChatResponse { content, usage })
}

impl LlmProvider for OllamaLlm {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let body = request_body(&self.model, &request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::error(format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let response_text = response
            .text()
            .await
            .map_err(|e| Self::error(format!("failed to read response body: {e}")))?;

        if !(200..300).contains(&status) {
            return Err(SproutError::Http {
                status,
                body: response_text,
            });
        }

        let parsed: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| Self::error(format!("failed to parse response JSON: {e}")))?;

        parse_response(&parsed)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
