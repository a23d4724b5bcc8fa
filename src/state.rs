//! Conversation state threaded through the agent loop.
//!
//! A turn usually accumulates messages in this pattern:
//! 1. `Human` - user input
//! 2. `Ai` with tool calls - the agent picks tools to gather information
//! 3. `Tool` message(s) - the results (or errors) of those tools
//! 4. `Ai` without tool calls - the agent answers the user
//!
//! Steps 2-3 repeat as needed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::llm::{ChatMessage, FunctionCall, Role, ToolCall};

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    pub call_id: String,
}

impl ToolCallRequest {
    /// Decode a wire tool call; unparseable arguments become an empty map.
    pub fn from_wire(call: &ToolCall) -> Self {
        let arguments = match serde_json::from_str::<Value>(&call.function.arguments) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!(
                    tool = %call.function.name,
                    "Tool call arguments are not a JSON object; using empty arguments"
                );
                Map::new()
            }
        };
        Self {
            name: call.function.name.clone(),
            arguments,
            call_id: call.id.clone(),
        }
    }

    fn to_wire(&self) -> ToolCall {
        ToolCall {
            id: self.call_id.clone(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: self.name.clone(),
                arguments: Value::Object(self.arguments.clone()).to_string(),
            },
        }
    }
}

/// A conversation message, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        #[serde(default = "new_message_id")]
        id: String,
        content: String,
    },
    Human {
        #[serde(default = "new_message_id")]
        id: String,
        content: String,
    },
    Ai {
        #[serde(default = "new_message_id")]
        id: String,
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        #[serde(default = "new_message_id")]
        id: String,
        content: String,
        tool_call_id: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            id: new_message_id(),
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Message::Human {
            id: new_message_id(),
            content: content.into(),
        }
    }

    pub fn ai(id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Ai {
            id: id.into(),
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn ai_with_tool_calls(
        id: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        Message::Ai {
            id: id.into(),
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            id: new_message_id(),
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Message::System { id, .. }
            | Message::Human { id, .. }
            | Message::Ai { id, .. }
            | Message::Tool { id, .. } => id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System { content, .. }
            | Message::Human { content, .. }
            | Message::Ai { content, .. }
            | Message::Tool { content, .. } => content,
        }
    }

    /// Tool calls requested by an AI message; empty for every other role.
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Message::Ai { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::System { .. } => "SystemMessage",
            Message::Human { .. } => "HumanMessage",
            Message::Ai { .. } => "AIMessage",
            Message::Tool { .. } => "ToolMessage",
        }
    }

    /// Convert to the chat completions wire format.
    pub fn to_chat_message(&self) -> ChatMessage {
        match self {
            Message::System { content, .. } => ChatMessage {
                role: Role::System,
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Human { content, .. } => ChatMessage {
                role: Role::User,
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Ai {
                content,
                tool_calls,
                ..
            } => ChatMessage {
                role: Role::Assistant,
                // Content may only be omitted when tool calls carry the message.
                content: (!content.is_empty() || tool_calls.is_empty()).then(|| content.clone()),
                tool_calls: (!tool_calls.is_empty())
                    .then(|| tool_calls.iter().map(ToolCallRequest::to_wire).collect()),
                tool_call_id: None,
            },
            Message::Tool {
                content,
                tool_call_id,
                ..
            } => ChatMessage {
                role: Role::Tool,
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(tool_call_id.clone()),
            },
        }
    }
}

/// Merge `updates` into `existing`.
///
/// A message whose id is already present replaces that message in place;
/// any other message is appended.
pub fn add_messages(mut existing: Vec<Message>, updates: Vec<Message>) -> Vec<Message> {
    for message in updates {
        match existing.iter().position(|m| m.id() == message.id()) {
            Some(index) => existing[index] = message,
            None => existing.push(message),
        }
    }
    existing
}

/// Messages produced by one step of the loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
}

/// The full state of one conversation turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct State {
    messages: Vec<Message>,
    /// Set by the loop driver when the step budget allows one more model call.
    is_last_step: bool,
}

impl State {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: add_messages(Vec::new(), messages),
            is_last_step: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn is_last_step(&self) -> bool {
        self.is_last_step
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Content of the closing AI message, if the turn ended with one.
    pub fn final_answer(&self) -> Option<&str> {
        match self.last_message() {
            Some(Message::Ai {
                content,
                tool_calls,
                ..
            }) if tool_calls.is_empty() => Some(content.as_str()),
            _ => None,
        }
    }

    /// Return a new state with `update` merged in.
    pub fn apply(self, update: StateUpdate) -> Self {
        Self {
            messages: add_messages(self.messages, update.messages),
            is_last_step: self.is_last_step,
        }
    }

    pub(crate) fn with_last_step(self, is_last_step: bool) -> Self {
        Self {
            is_last_step,
            ..self
        }
    }
}

impl From<Vec<Message>> for State {
    fn from(messages: Vec<Message>) -> Self {
        State::new(messages)
    }
}
