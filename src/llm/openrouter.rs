//! OpenRouter chat completions client.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChatMessage, ChatResponse, LlmClient, ToolCall, ToolDefinition};
use crate::config::DEFAULT_BASE_URL;

/// Client for OpenRouter or any OpenAI-compatible endpoint.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> anyhow::Result<ChatResponse> {
        let mut body = json!({
            "model": model,
            "messages": messages,
        });
        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            body["tools"] = serde_json::to_value(tools)?;
        }

        tracing::debug!(model, messages = messages.len(), "Sending chat completion");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Chat completion failed ({}): {}",
                status,
                text
            ));
        }

        let payload: Value = response.json().await?;
        parse_completion(payload)
    }
}

/// Extract the first choice of a chat completion payload.
fn parse_completion(payload: Value) -> anyhow::Result<ChatResponse> {
    let choice = payload["choices"]
        .get(0)
        .ok_or_else(|| anyhow::anyhow!("Chat completion returned no choices"))?;
    let message = match choice.get("message") {
        Some(message) if message.is_object() => message,
        _ => {
            return Err(anyhow::anyhow!(
                "Chat completion choice has no message: {}",
                choice.get("error").unwrap_or(choice)
            ))
        }
    };

    let tool_calls = match message.get("tool_calls") {
        Some(Value::Array(calls)) if !calls.is_empty() => Some(
            calls
                .iter()
                .cloned()
                .map(serde_json::from_value::<ToolCall>)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        _ => None,
    };

    Ok(ChatResponse {
        id: payload["id"].as_str().map(str::to_string),
        content: message["content"].as_str().map(str::to_string),
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_reply() {
        let response = parse_completion(json!({
            "id": "gen-123",
            "choices": [{
                "message": { "role": "assistant", "content": "It is sunny." }
            }]
        }))
        .unwrap();

        assert_eq!(response.id.as_deref(), Some("gen-123"));
        assert_eq!(response.content.as_deref(), Some("It is sunny."));
        assert!(response.tool_calls.is_none());
    }

    #[test]
    fn parses_tool_calls() {
        let response = parse_completion(json!({
            "id": "gen-456",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "c1",
                        "type": "function",
                        "function": {
                            "name": "search",
                            "arguments": "{\"query\":\"weather in Paris\"}"
                        }
                    }]
                }
            }]
        }))
        .unwrap();

        let calls = response.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "c1");
        assert_eq!(calls[0].function.name, "search");
        assert!(response.content.is_none());
    }

    #[test]
    fn missing_choices_is_an_error() {
        assert!(parse_completion(json!({ "error": "overloaded" })).is_err());
    }

    #[test]
    fn choice_without_message_is_an_error() {
        let err = parse_completion(json!({
            "id": "gen-789",
            "choices": [{
                "finish_reason": "error",
                "error": { "code": 502, "message": "provider timed out" }
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("provider timed out"));

        assert!(parse_completion(json!({ "choices": [{ "message": null }] })).is_err());
    }

    #[test]
    fn completions_url_ignores_trailing_slash() {
        let client = OpenRouterClient::new("key".to_string()).with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            client.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
