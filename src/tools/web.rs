//! Web search backends: Tavily and DuckDuckGo HTML.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::Config;

/// An external search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run `query`, returning at most `max_results` records, or `None` when
    /// the service has nothing.
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Option<Vec<Value>>>;
}

/// Pick Tavily when an API key is configured, DuckDuckGo otherwise.
pub fn search_backend_from_config(config: &Config) -> anyhow::Result<Arc<dyn SearchBackend>> {
    match &config.tavily_api_key {
        Some(key) => Ok(Arc::new(TavilySearch::new(key.clone())?)),
        None => {
            tracing::info!("TAVILY_API_KEY not set, using DuckDuckGo search");
            Ok(Arc::new(DuckDuckGoSearch::new()?))
        }
    }
}

fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (compatible; ReactAgent/1.0)")
        .timeout(Duration::from_secs(30))
        .build()
}

/// Tavily Search API.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
}

impl TavilySearch {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Option<Vec<Value>>> {
        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
        });

        let response = self
            .client
            .post("https://api.tavily.com/search")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Tavily error ({}): {}", status, text));
        }

        let data: Value = response.json().await?;
        Ok(tavily_results(data))
    }
}

fn tavily_results(mut data: Value) -> Option<Vec<Value>> {
    match data.get_mut("results").map(Value::take) {
        Some(Value::Array(results)) if !results.is_empty() => Some(results),
        _ => None,
    }
}

/// Keyless search through DuckDuckGo's HTML endpoint (best-effort).
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Option<Vec<Value>>> {
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("DuckDuckGo error: {}", status));
        }
        let html = response.text().await?;

        let results = extract_ddg_results(&html, max_results);
        Ok((!results.is_empty()).then_some(results))
    }
}

/// Extract `{title, url, snippet}` records from DuckDuckGo HTML.
fn extract_ddg_results(html: &str, limit: usize) -> Vec<Value> {
    let mut results = Vec::new();

    for chunk in html.split("class=\"result__body\"").skip(1) {
        if results.len() >= limit {
            break;
        }

        let title = field_text(chunk, "result__a");
        if title.is_empty() {
            continue;
        }
        let snippet = field_text(chunk, "result__snippet");
        let url = field_text(chunk, "result__url");

        results.push(json!({
            "title": html_decode(title),
            "url": url.trim(),
            "snippet": html_decode(snippet),
        }));
    }

    results
}

/// Text right after the element carrying `class`.
fn field_text<'a>(chunk: &'a str, class: &str) -> &'a str {
    chunk
        .split(&format!("class=\"{}\"", class))
        .nth(1)
        .and_then(|s| s.split('>').nth(1))
        .and_then(|s| s.split('<').next())
        .unwrap_or("")
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
}
