//! Symposium SDK
//!
//! Shared library providing the error type and the tool capability used by
//! the debate engine. Out-of-tree tools only need this crate to plug into
//! the engine's tool registry.

/// Error types and handling
pub mod errors;

/// Tool capability trait
pub mod tool;

/// Tool output and error types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, ErrorExt};
pub use tool::Tool;
pub use types::{ToolError, ToolOutput};
