use reqwest::Client;
use serde_json::json;
use sprout_core::error::{Result, SproutError};
use sprout_core::types::{ChatRequest, ChatResponse, Usage};

use crate::provider::LlmProvider;

/// Chat completion provider for any OpenAI-compatible endpoint
/// (OpenAI itself, Groq, local gateways).
pub struct OpenAiLlm {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiLlm {
    /// Create a new OpenAI-compatible provider.
    ///
    /// # Arguments
    /// * `base_url` - API root without the trailing path (e.g. "https://api.groq.com/openai/v1")
    /// * `api_key` - Bearer token
    /// * `model` - Model identifier (e.g. "llama-3.3-70b-versatile")
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    fn error(message: String) -> SproutError {
        SproutError::Llm {
            provider: "openai".to_string(),
            message,
        }
    }
}

fn request_body(model: &str, request: &ChatRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    let mut body = serde_json::Map::new();
    body.insert("model".to_string(), json!(model));
    body.insert("messages".to_string(), json!(messages));
    if let Some(max_tokens) = request.max_tokens {
        body.insert("max_tokens".to_string(), json!(max_tokens));
    }
    if let Some(temp) = request.temperature {
        body.insert("temperature".to_string(), json!(temp));
    }
    serde_json::Value::Object(body)
}

fn parse_response(parsed: &serde_json::Value) -> Result<ChatResponse> {
    let content = parsed["choices"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|choice| choice["message"]["content"].as_str())
        .ok_or_else(|| OpenAiLlm::error("missing choices[0].message.content in response".to_string()))?
        .to_string();

    let usage = match (
        parsed["usage"]["prompt_tokens"].as_u64(),
        parsed["usage"]["completion_tokens"].as_u64(),
    ) {
        (Some(input), Some(output)) => Some(Usage {
            input_tokens: input as u32,
            output_tokens: output as u32,
        }),
        _ => None,
    };

    Ok(ChatResponse { content, usage })
}

impl LlmProvider for OpenAiLlm {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = request_body(&self.model, &request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::types::ChatMessage;

    #[test]
    fn test_request_body_omits_unset_options() {
        let request = ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: None,
            temperature: Some(0.5),
        };
        let body = request_body("m", &request);
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["temperature"], 0.5);
    }

    #[test]
    fn test_parse_response_reads_content_and_usage() {
        let parsed = json!({
            "choices": [{ "message": { "role": "assistant", "content": "NO_ACTION" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
        });
        let response = parse_response(&parsed).unwrap();
        assert_eq!(response.content, "NO_ACTION");
        let usage = response.usage.unwrap();
        assert_eq!(usage.input_tokens, 12);
        assert_eq!(usage.output_tokens, 3);
    }

    #[test]
    fn test_parse_response_missing_content_is_error() {
        let parsed = json!({ "choices": [] });
        assert!(matches!(
            parse_response(&parsed),
            Err(SproutError::Llm { .. })
        ));
    }
}
