//! Tool module - capabilities the model may call by name.

mod search;
mod web;

pub use search::Search;
pub use web::{search_backend_from_config, DuckDuckGoSearch, SearchBackend, TavilySearch};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::Configuration;
use crate::error::AgentError;
use crate::llm::{FunctionDefinition, ToolDefinition};

/// A capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool with the model's arguments and the active configuration.
    async fn execute(&self, args: &Map<String, Value>, config: &Configuration)
        -> anyhow::Result<Value>;
}

/// Name and description of a registered tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Registry of available tools, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default tool set: web search over `backend`.
    pub fn with_search(backend: Arc<dyn SearchBackend>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Search::new(backend)));
        registry
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Function schemas to bind to the model, sorted by name.
    pub fn get_tool_schemas(&self) -> Vec<ToolDefinition> {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let tool = &self.tools[name];
                ToolDefinition {
                    tool_type: "function".to_string(),
                    function: FunctionDefinition {
                        name: tool.name().to_string(),
                        description: tool.description().to_string(),
                        parameters: tool.parameters_schema(),
                    },
                }
            })
            .collect()
    }

    /// Execute a tool by exact name.
    ///
    /// Typed failures raised inside the tool keep their variant; anything
    /// else is reported as `ToolFailed`.
    pub async fn execute(
        &self,
        name: &str,
        args: &Map<String, Value>,
        config: &Configuration,
    ) -> Result<Value, AgentError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        tool.execute(args, config)
            .await
            .map_err(|e| match e.downcast::<AgentError>() {
                Ok(agent_error) => agent_error,
                Err(source) => AgentError::ToolFailed {
                    tool: name.to_string(),
                    source,
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the arguments back."
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn execute(
            &self,
            args: &Map<String, Value>,
            _config: &Configuration,
        ) -> anyhow::Result<Value> {
            if args.contains_key("fail") {
                anyhow::bail!("echo refused");
            }
            Ok(Value::Object(args.clone()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));
        registry
    }

    #[tokio::test]
    async fn executes_by_exact_name() {
        let mut args = Map::new();
        args.insert("x".to_string(), json!(1));

        let value = registry()
            .execute("echo", &args, &Configuration::default())
            .await
            .unwrap();
        assert_eq!(value, json!({ "x": 1 }));
    }

    #[tokio::test]
    async fn unknown_name_is_rejected() {
        let err = registry()
            .execute("Echo", &Map::new(), &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "Echo"));
    }

    #[tokio::test]
    async fn untyped_failures_become_tool_failed() {
        let mut args = Map::new();
        args.insert("fail".to_string(), json!(true));

        let err = registry()
            .execute("echo", &args, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolFailed { ref tool, .. } if tool == "echo"));
        assert!(err.to_string().contains("echo refused"));
    }

    #[test]
    fn schemas_use_function_format() {
        let schemas = registry().get_tool_schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].tool_type, "function");
        assert_eq!(schemas[0].function.name, "echo");
    }
}
