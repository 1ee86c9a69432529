//! Error types and handling
//!
//! This module provides the error type used throughout the Symposium engine.
//! All errors implement the `ErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! Only a handful of failures ever reach a caller as an `EngineError`:
//! input validation and configuration problems are raised, while
//! generation, tool and persistence failures degrade inside a run (a
//! transcript sentinel, a tool error string, or a log line).

use thiserror::Error;

/// Trait for engine error extensions
///
/// Provides additional context for errors, including user-friendly hints
/// and recoverability information.
pub trait ErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors require the user to fix configuration or input first.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Validation**: Rejected input (empty question)
/// - **Configuration**: Invalid or missing configuration, missing persona
/// - **LLM Provider**: Generation backend failures
/// - **Tool**: Unknown tools or tool execution failures
/// - **Memory**: Memory store persistence failures
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, ErrorExt};
///
/// let error = EngineError::Validation("question cannot be empty".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(!error.is_recoverable());
///
/// let transient = EngineError::LLMProvider("connection refused".to_string());
/// assert!(transient.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persona not configured: {0}")]
    PersonaNotConfigured(String),

    // LLM provider errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("LLM call timed out")]
    LLMTimeout,

    // Tool errors
    #[error("Tool error: {0}")]
    ToolError(String),

    // Memory store errors
    #[error("Memory error: {0}")]
    Memory(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Validation(_) => "Provide a non-empty question",

            Self::Config(_) => "Check your config.toml file for errors",
            Self::PersonaNotConfigured(_) => "Add the persona under [personas] in config.toml",

            Self::LLMProvider(_) => "Model backend unavailable. Check the [model] settings",
            Self::LLMTimeout => "Model backend took too long to respond. Try again",

            Self::ToolError(_) => "Tool operation failed",

            Self::Memory(_) => "Memory file could not be read or written",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Fixing these requires user action
            Self::Validation(_) | Self::Config(_) | Self::PersonaNotConfigured(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
