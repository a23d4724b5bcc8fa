//! The two steps of the loop and the routing decision between them.

use futures::future::join_all;
use serde_json::json;
use uuid::Uuid;

use super::prompt::{build_system_prompt, system_time};
use crate::config::Configuration;
use crate::error::AgentError;
use crate::llm::{ChatMessage, LlmClient, Role};
use crate::state::{Message, State, StateUpdate, ToolCallRequest};
use crate::tools::ToolRegistry;

/// Reply substituted when the step budget runs out while tools are still requested.
pub const OUT_OF_STEPS_REPLY: &str =
    "Sorry, I could not find an answer to your question in the specified number of steps.";

/// Where control goes after the model replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Done,
    ExecuteTools,
}

/// Call the model once with the system directive and the full history.
pub async fn call_model(
    llm: &dyn LlmClient,
    tools: &ToolRegistry,
    state: &State,
    config: &Configuration,
) -> Result<StateUpdate, AgentError> {
    let system_message = build_system_prompt(&config.system_prompt, &system_time());

    let mut messages = Vec::with_capacity(state.messages().len() + 1);
    messages.push(ChatMessage {
        role: Role::System,
        content: Some(system_message),
        tool_calls: None,
        tool_call_id: None,
    });
    messages.extend(state.messages().iter().map(Message::to_chat_message));

    let tool_schemas = tools.get_tool_schemas();
    let response = llm
        .chat_completion(&config.model, &messages, Some(tool_schemas.as_slice()))
        .await
        .map_err(AgentError::ModelInvocation)?;

    // A backend id already in the history would overwrite that message on merge.
    let id = response
        .id
        .filter(|id| state.messages().iter().all(|m| m.id() != id.as_str()))
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let tool_calls: Vec<ToolCallRequest> = response
        .tool_calls
        .unwrap_or_default()
        .iter()
        .map(ToolCallRequest::from_wire)
        .collect();

    if state.is_last_step() && !tool_calls.is_empty() {
        tracing::warn!(
            requested = tool_calls.len(),
            "Step budget exhausted while tools were still requested"
        );
        return Ok(StateUpdate {
            messages: vec![Message::ai(id, OUT_OF_STEPS_REPLY)],
        });
    }

    let reply = Message::ai_with_tool_calls(id, response.content.unwrap_or_default(), tool_calls);
    Ok(StateUpdate {
        messages: vec![reply],
    })
}

/// Decide the next step from the model's latest reply.
pub fn route_model_output(state: &State) -> Result<Route, AgentError> {
    match state.last_message() {
        Some(message @ Message::Ai { .. }) => {
            if message.tool_calls().is_empty() {
                Ok(Route::Done)
            } else {
                Ok(Route::ExecuteTools)
            }
        }
        other => Err(AgentError::InvariantViolation {
            expected: "AIMessage",
            actual: other.map_or("nothing", Message::type_name).to_string(),
        }),
    }
}

/// Run every tool call of the latest AI message.
///
/// Calls run concurrently; results keep the order of the requests. A failure
/// that belongs to one call is returned to the model as an error payload so
/// sibling calls still complete.
pub async fn execute_tools(
    tools: &ToolRegistry,
    state: &State,
    config: &Configuration,
) -> Result<StateUpdate, AgentError> {
    let calls = match state.last_message() {
        Some(message @ Message::Ai { .. }) => message.tool_calls(),
        other => {
            return Err(AgentError::InvariantViolation {
                expected: "AIMessage",
                actual: other.map_or("nothing", Message::type_name).to_string(),
            })
        }
    };

    let results = join_all(calls.iter().map(|call| async move {
        tracing::debug!(tool = %call.name, call_id = %call.call_id, "Calling tool");
        (call, tools.execute(&call.name, &call.arguments, config).await)
    }))
    .await;

    let mut messages = Vec::with_capacity(results.len());
    for (call, result) in results {
        let content = match result {
            Ok(value) => value.to_string(),
            Err(e) if e.is_tool_local() => {
                tracing::warn!(tool = %call.name, call_id = %call.call_id, "Tool call failed: {}", e);
                json!({ "error": e.to_string() }).to_string()
            }
            Err(e) => return Err(e),
        };
        messages.push(Message::tool(&call.call_id, content));
    }

    Ok(StateUpdate { messages })
}
