//! Core agent loop implementation.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::nodes::{call_model, execute_tools, route_model_output, Route};
use crate::config::{Config, Configuration};
use crate::error::AgentError;
use crate::llm::{LlmClient, OpenRouterClient};
use crate::state::State;
use crate::tools::{search_backend_from_config, ToolRegistry};

/// Position of the loop between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    InvokeModel,
    ExecuteTools,
    Done,
}

impl From<Route> for Node {
    fn from(route: Route) -> Self {
        match route {
            Route::Done => Node::Done,
            Route::ExecuteTools => Node::ExecuteTools,
        }
    }
}

/// Whether model invocation number `invocation` (1-based) is the last one allowed.
pub fn is_last_step(invocation: usize, max_iterations: usize) -> bool {
    invocation >= max_iterations
}

/// The ReAct agent: a model step and a tool step in a cycle.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    max_iterations: usize,
    defaults: Configuration,
}

impl Agent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
            defaults: Configuration::default(),
        }
    }

    /// Build an agent backed by OpenRouter and the configured search backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = Arc::new(
            OpenRouterClient::new(config.api_key.clone()).with_base_url(config.base_url.clone()),
        );
        let tools = ToolRegistry::with_search(search_backend_from_config(config)?);

        Ok(Self::new(llm, tools, config.max_iterations).with_defaults(config.configuration()))
    }

    /// Configuration that overrides are applied on top of.
    pub fn with_defaults(mut self, defaults: Configuration) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run one turn from `input` until the model gives a final answer.
    pub async fn invoke(
        &self,
        input: impl Into<State>,
        overrides: &Map<String, Value>,
    ) -> Result<State, AgentError> {
        if self.max_iterations == 0 {
            return Err(AgentError::Configuration(
                "step budget must allow at least one model call".to_string(),
            ));
        }

        let config = self.defaults.clone().with_overrides(overrides);
        let mut state: State = input.into();
        let mut node = Node::InvokeModel;
        let mut invocations = 0;

        tracing::info!(
            model = %config.model,
            messages = state.messages().len(),
            "Starting agent turn"
        );

        while node != Node::Done {
            if node == Node::InvokeModel {
                invocations += 1;
                tracing::debug!("Agent iteration {}", invocations);
                state = state.with_last_step(is_last_step(invocations, self.max_iterations));
            }
            let (next_state, next_node) = self.step(&state, node, &config).await?;
            state = next_state;
            node = next_node;
        }

        tracing::info!(
            invocations,
            messages = state.messages().len(),
            "Agent turn finished"
        );
        Ok(state)
    }

    /// Advance the loop by one node.
    ///
    /// Returns a new state with the step's messages merged in. `state` is only
    /// borrowed, so dropping the future mid-step leaves it as it was.
    pub async fn step(
        &self,
        state: &State,
        node: Node,
        config: &Configuration,
    ) -> Result<(State, Node), AgentError> {
        match node {
            Node::InvokeModel => {
                let update = call_model(self.llm.as_ref(), &self.tools, state, config).await?;
                let state = state.clone().apply(update);
                let route = route_model_output(&state)?;
                tracing::debug!(?route, "Routed model output");
                Ok((state, route.into()))
            }
            Node::ExecuteTools => {
                let update = execute_tools(&self.tools, state, config).await?;
                Ok((state.clone().apply(update), Node::InvokeModel))
            }
            Node::Done => Ok((state.clone(), Node::Done)),
        }
    }
}
