//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::{Message, State};

/// Request to run one agent turn.
#[derive(Debug, Clone, Deserialize)]
pub struct InvokeRequest {
    /// Conversation so far; appended to `message` when both are given
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Shorthand for a single human message
    #[serde(default)]
    pub message: Option<String>,

    /// Configuration overrides (`system_prompt`, `model`, `max_search_results`)
    #[serde(default)]
    pub configurable: Map<String, Value>,
}

impl InvokeRequest {
    /// Initial messages for the turn.
    pub fn into_messages(self) -> Vec<Message> {
        let mut messages = self.messages;
        if let Some(text) = self.message {
            messages.push(Message::human(text));
        }
        messages
    }
}

/// Result of an agent turn.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeResponse {
    /// Content of the closing AI message
    pub answer: Option<String>,

    /// Full conversation after the turn
    pub messages: Vec<Message>,
}

impl From<State> for InvokeResponse {
    fn from(state: State) -> Self {
        Self {
            answer: state.final_answer().map(str::to_string),
            messages: state.into_messages(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
