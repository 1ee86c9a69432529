//! Tool capability trait
//!
//! Every external helper a participant can call (search, arithmetic, clock)
//! implements [`Tool`]. The engine keeps an explicit name → tool map and
//! converts any [`ToolError`] into a descriptive string before it reaches
//! a participant, so implementations are free to fail.

use async_trait::async_trait;

use crate::types::{ToolError, ToolOutput};

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the registry name of the tool (e.g. "calculate")
    fn name(&self) -> &str;

    /// Returns a one-line description shown by `symposium tools`
    fn description(&self) -> &str;

    /// Execute the tool against a free-form query
    async fn execute(&self, query: &str) -> Result<ToolOutput, ToolError>;
}
