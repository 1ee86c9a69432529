//! Symposium Engine Library
//!
//! This library provides the core functionality of the Symposium debate
//! engine. It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Telemetry and Observability
pub mod telemetry;

/// Text-generation backends
pub mod llm;

/// Conversation transcript types
pub mod transcript;

/// Bounded key-value memory shared by participants
pub mod memory;

/// Debate personas
pub mod participants;

/// Built-in tools and the tool-dispatch heuristic
pub mod tools;

/// Debate orchestration and streaming sessions
pub mod orchestrator;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
