//! Errors raised while driving a conversation turn.

use thiserror::Error;

/// Failure of a single turn of the agent loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A configuration value was malformed when it was used.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The conversation did not have the shape the loop requires.
    #[error("Expected {expected} in output edges, but got {actual}")]
    InvariantViolation {
        expected: &'static str,
        actual: String,
    },

    /// The model asked for a tool that is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The model supplied arguments the tool cannot use.
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// A tool failed for a reason of its own.
    #[error("Tool '{tool}' failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    /// The language-model backend call failed.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[source] anyhow::Error),

    /// The search backend call failed.
    #[error("Search backend failed: {0}")]
    SearchBackend(#[source] anyhow::Error),
}

impl AgentError {
    /// Whether this failure belongs to one tool call and can be reported back
    /// to the model as a tool result instead of aborting the turn.
    pub fn is_tool_local(&self) -> bool {
        matches!(
            self,
            AgentError::UnknownTool(_)
                | AgentError::InvalidArguments { .. }
                | AgentError::ToolFailed { .. }
                | AgentError::SearchBackend(_)
        )
    }
}
