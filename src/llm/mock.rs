//! Scripted LLM client for loop tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ChatMessage, ChatResponse, FunctionCall, LlmClient, ToolCall, ToolDefinition};

/// One scripted reply.
#[derive(Debug, Clone)]
pub(crate) enum MockReply {
    Text { id: String, content: String },
    ToolCalls { id: String, calls: Vec<(String, String, Value)> },
    Error(String),
    /// Never resolves.
    Pending,
}

impl MockReply {
    pub(crate) fn text(id: &str, content: &str) -> Self {
        MockReply::Text {
            id: id.to_string(),
            content: content.to_string(),
        }
    }

    pub(crate) fn tool_call(id: &str, call_id: &str, name: &str, arguments: Value) -> Self {
        MockReply::ToolCalls {
            id: id.to_string(),
            calls: vec![(call_id.to_string(), name.to_string(), arguments)],
        }
    }

    fn into_response(self) -> anyhow::Result<ChatResponse> {
        match self {
            MockReply::Text { id, content } => Ok(ChatResponse {
                id: Some(id),
                content: Some(content),
                tool_calls: None,
            }),
            MockReply::ToolCalls { id, calls } => Ok(ChatResponse {
                id: Some(id),
                content: None,
                tool_calls: Some(
                    calls
                        .into_iter()
                        .map(|(call_id, name, arguments)| ToolCall {
                            id: call_id,
                            call_type: "function".to_string(),
                            function: FunctionCall {
                                name,
                                arguments: arguments.to_string(),
                            },
                        })
                        .collect(),
                ),
            }),
            MockReply::Error(message) => Err(anyhow::anyhow!(message)),
            MockReply::Pending => unreachable!("pending replies never produce a response"),
        }
    }
}

/// What the client was asked for on one call.
#[derive(Debug, Clone)]
pub(crate) struct MockRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tool_count: usize,
}

/// Replays scripted replies and records every request it receives.
///
/// Once the script is exhausted it either requests a search on every call
/// (`always_searching`) or answers with a fixed text.
pub(crate) struct ScriptedLlm {
    script: Mutex<VecDeque<MockReply>>,
    always_search: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<MockRequest>>,
}

impl ScriptedLlm {
    pub(crate) fn new(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            always_search: false,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always_searching() -> Self {
        Self {
            always_search: true,
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, oldest first.
    pub(crate) fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> anyhow::Result<ChatResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests
            .lock()
            .unwrap()
            .push(MockRequest {
                model: model.to_string(),
                messages: messages.to_vec(),
                tool_count: tools.map_or(0, |t| t.len()),
            });

        let next = self.script.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => reply,
            None if self.always_search => MockReply::tool_call(
                &format!("ai-{n}"),
                &format!("call-{n}"),
                "search",
                serde_json::json!({ "query": format!("attempt {n}") }),
            ),
            None => MockReply::text(&format!("ai-{n}"), "done"),
        };
        if let MockReply::Pending = reply {
            return std::future::pending().await;
        }
        reply.into_response()
    }
}
