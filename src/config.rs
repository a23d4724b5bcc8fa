//! Configuration management for the ReAct agent.
//!
//! Process configuration is set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `OPENROUTER_BASE_URL` - Optional. OpenAI-compatible endpoint. Defaults to `https://openrouter.ai/api/v1`.
//! - `TAVILY_API_KEY` - Optional. Enables Tavily search; DuckDuckGo is used otherwise.
//! - `DEFAULT_MODEL` - Optional. The default LLM model to use. Defaults to `anthropic/claude-3.5-sonnet`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `MAX_ITERATIONS` - Optional. Model invocations allowed per turn. Defaults to `25`.
//!
//! Per-invocation settings live in [`Configuration`], built from a caller's
//! override map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::agent::SYSTEM_PROMPT;
use crate::error::AgentError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_MAX_SEARCH_RESULTS: u64 = 10;
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Base URL of the chat completions API
    pub base_url: String,

    /// Tavily API key; `None` selects the keyless search backend
    pub tavily_api_key: Option<String>,

    /// Default LLM model identifier (`provider/model-name`)
    pub default_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Model invocations allowed per turn
    pub max_iterations: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let base_url =
            std::env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let tavily_api_key = std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let max_iterations = std::env::var("MAX_ITERATIONS")
            .ok()
            .map(|v| parse_max_iterations(&v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_ITERATIONS);

        Ok(Self {
            api_key,
            base_url,
            tavily_api_key,
            default_model,
            host,
            port,
            max_iterations,
        })
    }

    /// Create a config with default values (useful for testing).
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            tavily_api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Per-invocation defaults derived from the process configuration.
    pub fn configuration(&self) -> Configuration {
        Configuration {
            model: self.default_model.clone(),
            ..Configuration::default()
        }
    }
}

fn parse_max_iterations(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue(
            "MAX_ITERATIONS".to_string(),
            "must be at least 1".to_string(),
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue(
            "MAX_ITERATIONS".to_string(),
            format!("{}", e),
        )),
    }
}

/// Search result limit as supplied by the caller.
///
/// The raw value is kept until a tool reads it, so a malformed override only
/// fails the call that uses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchLimit(Value);

impl SearchLimit {
    /// The limit as a positive count.
    pub fn resolve(&self) -> Result<usize, AgentError> {
        match self.0.as_u64() {
            Some(n) if n > 0 => Ok(n as usize),
            _ => Err(AgentError::Configuration(format!(
                "max_search_results must be a positive integer, got {}",
                self.0
            ))),
        }
    }
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self(Value::from(DEFAULT_MAX_SEARCH_RESULTS))
    }
}

impl From<u64> for SearchLimit {
    fn from(n: u64) -> Self {
        Self(Value::from(n))
    }
}

/// Runtime parameters of one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    /// System prompt template; `{system_time}` is replaced with the current time.
    pub system_prompt: String,

    /// Language model in `provider/model-name` form.
    pub model: String,

    /// Maximum search results returned per query.
    pub max_search_results: SearchLimit,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_search_results: SearchLimit::default(),
        }
    }
}

impl Configuration {
    /// Keys accepted from an override map.
    pub const FIELDS: [&'static str; 3] = ["system_prompt", "model", "max_search_results"];

    /// Build a configuration from defaults plus the recognized `overrides`.
    pub fn from_overrides(overrides: &Map<String, Value>) -> Self {
        Self::default().with_overrides(overrides)
    }

    /// Apply the recognized keys of `overrides`; other keys are ignored.
    pub fn with_overrides(mut self, overrides: &Map<String, Value>) -> Self {
        for (key, value) in overrides
            .iter()
            .filter(|(key, _)| Self::FIELDS.contains(&key.as_str()))
        {
            match key.as_str() {
                "system_prompt" => self.system_prompt = text_value(value),
                "model" => self.model = text_value(value),
                "max_search_results" => self.max_search_results = SearchLimit(value.clone()),
                _ => {}
            }
        }
        self
    }
}

/// Strings are taken as-is; any other JSON value keeps its JSON rendering.
fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
