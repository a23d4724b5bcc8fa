//! Agent module - the ReAct control loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Call the model with the system prompt, the history and the tool schemas
//! 2. If the reply requests tools, execute them and append their results
//! 3. Go back to 1 until the model answers without tools
//!
//! The last model call allowed by the step budget may not request tools; if
//! it does, the reply is replaced with a fixed apology.

mod agent_loop;
mod nodes;
mod prompt;

pub use agent_loop::{is_last_step, Agent, Node};
pub use nodes::{call_model, execute_tools, route_model_output, Route, OUT_OF_STEPS_REPLY};
pub use prompt::{build_system_prompt, system_time, SYSTEM_PROMPT};
