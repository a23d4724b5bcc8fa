//! # ReAct Agent
//!
//! A minimal reasoning-and-acting agent with web search.
//!
//! This library provides:
//! - A control loop alternating between a language model and the tools it requests
//! - A tool registry with a web search capability (Tavily or DuckDuckGo)
//! - Integration with OpenRouter for LLM access
//! - An HTTP API for running turns
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive the conversation and configuration overrides
//! 2. Call the LLM with a timestamped system prompt and the tool schemas
//! 3. Execute any requested tool calls and append their results
//! 4. Feed results back to the LLM, repeat until it answers or the step budget runs out
//!
//! ## Example
//!
//! ```rust,ignore
//! use react_agent::{agent::Agent, config::Config, state::Message};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::from_config(&config)?;
//! let state = agent
//!     .invoke(vec![Message::human("What's the weather in Paris?")], &Default::default())
//!     .await?;
//! println!("{}", state.final_answer().unwrap_or_default());
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod state;
pub mod tools;

pub use agent::Agent;
pub use config::{Config, Configuration};
pub use error::AgentError;
pub use state::{Message, State};
