use async_trait::async_trait;
use indoc::indoc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::Toolkit;
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

pub const SEARCH_TOOL_NAME: &str = "tavily_search_results_json";
pub const DEFAULT_SEARCH_HOST: &str = "https://api.tavily.com";
pub const DEFAULT_MAX_RESULTS: usize = 2;

#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    pub host: String,
    pub api_key: String,
    pub max_results: usize,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl SearchResult {
    fn snippet(&self) -> String {
        [&self.title, &self.url, &self.content]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Web search backed by the Tavily search API
pub struct WebSearch {
    tools: Vec<Tool>,
    client: Client,
    config: WebSearchConfig,
}

impl WebSearch {
    pub fn new(config: WebSearchConfig) -> anyhow::Result<Self> {
        let search_tool = Tool::new(
            SEARCH_TOOL_NAME,
            "A search engine optimized for comprehensive, accurate, and trusted results. \
            Useful for when you need to answer questions about current events. \
            Input should be a search query.",
            json!({
                "type": "object",
                "required": ["query"],
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to look up."
                    }
                }
            }),
        );
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            tools: vec![search_tool],
            client,
            config,
        })
    }

    async fn search(&self, params: Value) -> AgentResult<Vec<Content>> {
        let query = params
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or_else(|| AgentError::InvalidParameters("query parameter required".into()))?;

        let url = format!("{}/search", self.config.host.trim_end_matches('/'));
        let request = SearchRequest {
            api_key: &self.config.api_key,
            query,
            max_results: self.config.max_results,
        };

        tracing::debug!(query, max_results = self.config.max_results, "searching the web");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ExecutionError(format!(
                "Search failed with status {}: {}",
                status, body
            )));
        }

        let results: SearchResponse = response.json().await.map_err(|e| {
            AgentError::ExecutionError(format!("Could not read search results: {}", e))
        })?;

        if results.results.is_empty() {
            return Ok(vec![Content::text(format!("No results found for '{}'", query))]);
        }

        Ok(results
            .results
            .iter()
            .take(self.config.max_results)
            .map(|result| Content::text(result.snippet()))
            .collect())
    }
}

#[async_trait]
impl Toolkit for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information"
    }

    fn instructions(&self) -> &str {
        indoc! {r#"
            Use the search tool when the question depends on recent events or on facts you are
            unsure about. Keep queries short and specific, then answer from the returned snippets.
        "#}
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        match tool_call.name.as_str() {
            SEARCH_TOOL_NAME => self.search(tool_call.arguments).await,
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn toolkit_for(server: &MockServer) -> WebSearch {
        WebSearch::new(WebSearchConfig {
            host: server.uri(),
            api_key: "tvly-test".to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_one_content_per_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({
                "api_key": "tvly-test",
                "query": "node meaning",
                "max_results": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "node meaning",
                "results": [
                    {"title": "Nodes", "url": "https://example.com/nodes", "content": "a node is...", "score": 0.9},
                    {"title": "Graphs", "url": "https://example.com/graphs", "content": "graphs have nodes", "score": 0.8}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let toolkit = toolkit_for(&server);
        let contents = toolkit
            .call(ToolCall::new(SEARCH_TOOL_NAME, json!({"query": "node meaning"})))
            .await
            .unwrap();

        assert_eq!(contents.len(), 2);
        assert_eq!(
            contents[0].as_text(),
            Some("Nodes\nhttps://example.com/nodes\na node is...")
        );
    }

    #[tokio::test]
    async fn test_search_with_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let contents = toolkit_for(&server)
            .call(ToolCall::new(SEARCH_TOOL_NAME, json!({"query": "nothing"})))
            .await
            .unwrap();

        assert_eq!(contents, vec![Content::text("No results found for 'nothing'")]);
    }

    #[tokio::test]
    async fn test_search_http_failure_is_execution_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = toolkit_for(&server)
            .call(ToolCall::new(SEARCH_TOOL_NAME, json!({"query": "x"})))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ExecutionError(ref msg) if msg.contains("401")));
        assert!(!err.is_request_error());
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid_parameters() {
        let server = MockServer::start().await;
        let toolkit = toolkit_for(&server);

        let err = toolkit
            .call(ToolCall::new(SEARCH_TOOL_NAME, json!({"query": "   "})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));

        let err = toolkit
            .call(ToolCall::new(SEARCH_TOOL_NAME, json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let server = MockServer::start().await;
        let toolkit = toolkit_for(&server);

        assert!(toolkit.has_tool(SEARCH_TOOL_NAME));
        assert!(!toolkit.has_tool("bash"));

        let err = toolkit
            .call(ToolCall::new("bash", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("bash".to_string()));
    }
}
