pub mod calculator;
pub mod clock;
pub mod dispatch;
pub mod web_search;

pub use calculator::CalculatorTool;
pub use clock::ClockTool;
pub use dispatch::{detect_tool, extract_query, should_use_tools, ToolKind};
pub use web_search::WebSearchTool;

use sdk::errors::EngineError;
use sdk::tool::Tool;
use std::collections::HashMap;
use tracing::{debug, error, warn};

use crate::config::Config;

/// Registry of tools available to participants.
///
/// Tools are registered explicitly at startup; only registered tools can
/// be dispatched. Dispatch never fails: unknown names and tool errors come
/// back as descriptive strings the participant can put in its prompt.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry with no tools enabled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register the built-in tools enabled under `[tools]`
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let mut registry = Self::empty();

        let search = config.tool_config("web_search");
        if search.enabled {
            let tool = WebSearchTool::new(search.max_results, search.timeout_secs)
                .map_err(|e| EngineError::ToolError(e.to_string()))?;
            registry.register(Box::new(tool));
        }

        if config.tool_config("calculate").enabled {
            registry.register(Box::new(CalculatorTool::new()));
        }

        if config.tool_config("get_current_info").enabled {
            registry.register(Box::new(ClockTool::new()));
        }

        debug!("Registered tools: {}", registry.names().join(", "));
        Ok(registry)
    }

    /// Add a tool, replacing any tool already registered under its name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("Replaced previously registered tool '{}'", name);
        }
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs, sorted by name
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|tool| (tool.name(), tool.description()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool by name, flattening its output to text.
    ///
    /// Errors are returned as strings so the participant can still use them.
    pub async fn dispatch(&self, name: &str, query: &str) -> String {
        debug!("Dispatching tool '{}' with query: {}", name, query);

        let Some(tool) = self.tools.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return format!("Error: Tool '{}' not found", name);
        };

        match tool.execute(query).await {
            Ok(output) => output.into_text(),
            Err(e) => {
                error!("Tool execution error ({}): {}", name, e);
                format!("Tool execution error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sdk::types::{ToolError, ToolOutput};

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        async fn execute(&self, _query: &str) -> Result<ToolOutput, ToolError> {
            Err(ToolError::RequestFailed("upstream down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::empty();
        assert_eq!(
            registry.dispatch("teleport", "x").await,
            "Error: Tool 'teleport' not found"
        );
    }

    #[tokio::test]
    async fn test_tool_error_is_stringified() {
        let mut registry = ToolRegistry::empty();
        registry.register(Box::new(FailingTool));
        assert_eq!(
            registry.dispatch("broken", "x").await,
            "Tool execution error: Request failed: upstream down"
        );
    }

    #[tokio::test]
    async fn test_dispatch_calculator() {
        let mut registry = ToolRegistry::empty();
        registry.register(Box::new(CalculatorTool::new()));
        assert_eq!(registry.dispatch("calculate", "5 + 3").await, "Result: 8");
    }

    #[test]
    fn test_from_config_respects_enabled() {
        let mut config = Config::default();
        config
            .tools
            .get_mut("web_search")
            .expect("default web_search config")
            .enabled = false;

        let registry = ToolRegistry::from_config(&config).unwrap();
        assert_eq!(registry.names(), vec!["calculate", "get_current_info"]);
        assert!(!registry.contains("web_search"));
    }

    #[test]
    fn test_descriptions_sorted() {
        let registry = ToolRegistry::from_config(&Config::default()).unwrap();
        let names: Vec<&str> = registry.descriptions().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["calculate", "get_current_info", "web_search"]);
        assert_eq!(registry.len(), 3);
    }
}
