//! Tool output and error types

use serde::{Deserialize, Serialize};

/// Output from a tool invocation
///
/// Tools answer either with a single block of text or with a list of
/// short items (search hits, for instance). Prompt builders flatten lists
/// with [`ToolOutput::into_text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// A single text result
    Text(String),

    /// A list of text items
    List(Vec<String>),
}

impl ToolOutput {
    /// Create a text output
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a list output
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Flatten into a single string, joining list items with newlines
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::List(items) => items.join("\n"),
        }
    }

    /// Returns true if the output carries no text at all
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.iter().all(|i| i.is_empty()),
        }
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Tool-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("{0}")]
    Other(String),
}
