//! General web search tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::{SearchBackend, Tool};
use crate::config::Configuration;
use crate::error::AgentError;

/// Search for general web results.
///
/// Results come back exactly as the backend returns them, bounded by the
/// configured `max_search_results`. An empty backend answer yields `null`.
pub struct Search {
    backend: Arc<dyn SearchBackend>,
}

impl Search {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for Search {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search for general web results. Useful for answering questions about current events."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        config: &Configuration,
    ) -> anyhow::Result<Value> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::InvalidArguments {
                tool: self.name().to_string(),
                message: "Missing 'query' argument".to_string(),
            })?;
        let max_results = config.max_search_results.resolve()?;

        tracing::debug!(query, max_results, "Running web search");

        let results = self
            .backend
            .search(query, max_results)
            .await
            .map_err(AgentError::SearchBackend)?;

        Ok(results.map(Value::Array).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns `available` canned results, honoring the requested limit.
    struct CannedBackend {
        available: usize,
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl SearchBackend for CannedBackend {
        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> anyhow::Result<Option<Vec<Value>>> {
            self.seen
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            if self.available == 0 {
                return Ok(None);
            }
            Ok(Some(
                (0..self.available.min(max_results))
                    .map(|i| json!({ "title": format!("result {i}"), "url": "https://example.com" }))
                    .collect(),
            ))
        }
    }

    fn tool(available: usize) -> (Search, Arc<CannedBackend>) {
        let backend = Arc::new(CannedBackend {
            available,
            seen: Mutex::new(Vec::new()),
        });
        (Search::new(backend.clone()), backend)
    }

    fn query(q: &str) -> Map<String, Value> {
        let mut args = Map::new();
        args.insert("query".to_string(), json!(q));
        args
    }

    #[tokio::test]
    async fn passes_configured_limit_to_backend() {
        let (search, backend) = tool(50);
        let mut config = Configuration::default();
        config.max_search_results = 3u64.into();

        let value = search
            .execute(&query("weather in Paris"), &config)
            .await
            .unwrap();

        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(
            backend.seen.lock().unwrap().as_slice(),
            &[("weather in Paris".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn empty_backend_answer_is_null() {
        let (search, _) = tool(0);
        let value = search
            .execute(&query("nothing"), &Configuration::default())
            .await
            .unwrap();
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let (search, backend) = tool(5);
        let err = search
            .execute(&Map::new(), &Configuration::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AgentError>(),
            Some(AgentError::InvalidArguments { .. })
        ));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_limit_is_a_configuration_error() {
        let (search, _) = tool(5);
        let mut overrides = Map::new();
        overrides.insert("max_search_results".to_string(), json!(-1));
        let config = Configuration::from_overrides(&overrides);

        let err = search.execute(&query("q"), &config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AgentError>(),
            Some(AgentError::Configuration(_))
        ));
    }
}
