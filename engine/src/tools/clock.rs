//! Current date/time tool

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use sdk::tool::Tool;
use sdk::types::{ToolError, ToolOutput};

/// Reports the local date, time, or both
#[derive(Debug, Default, Clone)]
pub struct ClockTool;

impl ClockTool {
    pub fn new() -> Self {
        Self
    }

    /// Format `now` for the requested mode (`date`, `time`, anything else = both)
    pub fn format_at<Tz>(mode: &str, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match mode.trim().to_lowercase().as_str() {
            "date" => now.format("%Y-%m-%d").to_string(),
            "time" => now.format("%H:%M:%S").to_string(),
            _ => now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "get_current_info"
    }

    fn description(&self) -> &str {
        "Report the current local date and/or time (query: date, time or datetime)"
    }

    async fn execute(&self, query: &str) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(Self::format_at(query, &Local::now())))
    }
}
