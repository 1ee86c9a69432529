//! Web search tool backed by the DuckDuckGo Instant Answer API
//!
//! Returns a short list of lines: the abstract (`Summary: ...`), the text
//! of up to `max_results` related topics, and a definition when present.
//! Network problems are reported as list items rather than errors.

use async_trait::async_trait;
use reqwest::Client;
use sdk::tool::Tool;
use sdk::types::{ToolError, ToolOutput};
use serde_json::Value;
use std::time::Duration;

/// Default endpoint
pub const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";

/// DuckDuckGo instant-answer search
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    endpoint: String,
    max_results: usize,
    timeout_secs: u64,
    client: Client,
}

impl WebSearchTool {
    /// Create a search tool against the public DuckDuckGo endpoint
    pub fn new(max_results: usize, timeout_secs: u64) -> Result<Self, ToolError> {
        Self::with_endpoint(DUCKDUCKGO_URL, max_results, timeout_secs)
    }

    /// Create a search tool against a custom endpoint
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        max_results: usize,
        timeout_secs: u64,
    ) -> Result<Self, ToolError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ToolError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            max_results,
            timeout_secs,
            client,
        })
    }

    /// Run a search, always producing at least one line
    pub async fn search(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return vec!["No query provided".to_string()];
        }

        tracing::debug!(query, "Searching DuckDuckGo");

        match self.fetch(query).await {
            Ok(data) => {
                let results = extract_results(&data, self.max_results);
                if results.is_empty() {
                    vec!["No results found".to_string()]
                } else {
                    results
                }
            }
            Err(e) if e.is_timeout() => {
                vec![format!("Search timed out after {} seconds", self.timeout_secs)]
            }
            Err(e) => {
                tracing::warn!("Web search failed: {}", e);
                vec![format!("Search error: {}", e)]
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Pull the summary, related topics and definition out of a response body
fn extract_results(data: &Value, max_results: usize) -> Vec<String> {
    let mut results = Vec::new();

    if let Some(abstract_text) = non_empty_str(data.get("Abstract")) {
        results.push(format!("Summary: {}", abstract_text));
    }

    if let Some(topics) = data.get("RelatedTopics").and_then(Value::as_array) {
        results.extend(
            topics
                .iter()
                .take(max_results)
                .filter_map(|topic| non_empty_str(topic.get("Text")))
                .map(str::to_string),
        );
    }

    if let Some(definition) = non_empty_str(data.get("Definition")) {
        results.push(format!("Definition: {}", definition));
    }

    results
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web via DuckDuckGo instant answers"
    }

    async fn execute(&self, query: &str) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::List(self.search(query).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_full_response() {
        let data = json!({
            "Abstract": "Stoicism is a school of Hellenistic philosophy.",
            "RelatedTopics": [
                {"Text": "Zeno of Citium"},
                {"Name": "Category without text", "Topics": []},
                {"Text": "Epictetus"},
                {"Text": "Marcus Aurelius"}
            ],
            "Definition": "Endurance of hardship without complaint."
        });

        let results = extract_results(&data, 3);
        assert_eq!(
            results,
            vec![
                "Summary: Stoicism is a school of Hellenistic philosophy.",
                "Zeno of Citium",
                "Epictetus",
                "Definition: Endurance of hardship without complaint.",
            ]
        );
    }

    #[test]
    fn test_extract_empty_response() {
        let data = json!({"Abstract": "", "RelatedTopics": [], "Definition": ""});
        assert!(extract_results(&data, 5).is_empty());
    }

    #[tokio::test]
    async fn test_empty_query() {
        let tool = WebSearchTool::new(5, 1).unwrap();
        assert_eq!(tool.search("   ").await, vec!["No query provided"]);
    }
}
