//! Configuration management
//!
//! This module handles loading, validation, and management of the Symposium
//! configuration. Configuration is stored in TOML format at
//! ~/.symposium/config.toml.
//!
//! # Configuration Sections
//!
//! - **logging**: Log level, optional log file, console output
//! - **model**: Text-generation backend (ollama or an OpenAI-compatible server)
//! - **memory**: Memory store persistence and capacity
//! - **orchestrator**: Rounds, summary, ordering, retries
//! - **tools**: Per-tool enablement, timeout and result limits
//! - **personas**: One table per debate role
//!
//! Every field has a default, so a partial file (or an empty one) is valid.
//!
//! # Examples
//!
//! ```no_run
//! use symposium_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Backend: {}", config.model.backend);
//! println!("Rounds: {}", config.orchestrator.default_rounds);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Backends understood by [`crate::llm::build_generator`]
pub const SUPPORTED_BACKENDS: &[&str] = &["ollama", "openai"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Text-generation backend settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Memory store settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Debate orchestration settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Tool settings keyed by tool name
    #[serde(default = "default_tools")]
    pub tools: BTreeMap<String, ToolConfig>,

    /// Persona settings keyed by role (questioner, theorist, practitioner, summarizer)
    #[serde(default = "default_personas")]
    pub personas: BTreeMap<String, PersonaConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file (supports ~ expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Write logs to the console
    #[serde(default = "default_true")]
    pub console: bool,
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Backend name (ollama, openai)
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Model name passed to the backend
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Base URL override; each backend has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

impl ModelConfig {
    /// Base URL to use, falling back to the backend's well-known default
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => match self.backend.as_str() {
                "openai" => default_openai_base_url(),
                _ => default_ollama_base_url(),
            },
        }
    }
}

/// Memory store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Persist memory to disk at all
    #[serde(default = "default_true")]
    pub persist: bool,

    /// JSON file holding the memory (supports ~ expansion)
    #[serde(default = "default_persist_path")]
    pub persist_path: PathBuf,

    /// Flush to disk on every mutation
    #[serde(default = "default_true")]
    pub auto_save: bool,

    /// Maximum number of entries kept before the oldest is evicted
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Debate orchestration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Rounds per debate when the caller does not override it
    #[serde(default = "default_rounds")]
    pub default_rounds: u32,

    /// Ask the summarizer for a closing synthesis
    #[serde(default = "default_true")]
    pub enable_summary: bool,

    /// Seed for participant shuffling; unset means entropy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,

    /// Attempts per participant turn before the error sentinel is used
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Shuffle participant order each round
    #[serde(default = "default_true")]
    pub random_order: bool,
}

/// Configuration for a single tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Register the tool at startup
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Timeout for network-backed tools, in seconds
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of items a list-returning tool produces
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Persona table as written in config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Display name; defaults to the title-cased role key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Persona-specific system prompt fragment
    #[serde(default)]
    pub instruction: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Generation budget in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Allow the persona to call tools
    #[serde(default)]
    pub tools_enabled: bool,
}

/// Immutable per-persona parameters handed to a participant
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub instruction: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub tools_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            console: true,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model_name: default_model_name(),
            base_url: None,
            timeout_secs: default_model_timeout(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            persist: true,
            persist_path: default_persist_path(),
            auto_save: true,
            max_entries: default_max_entries(),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_rounds: default_rounds(),
            enable_summary: true,
            random_seed: None,
            max_retries: default_max_retries(),
            random_order: true,
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_tool_timeout(),
            max_results: default_max_results(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_backend() -> String {
    "ollama".to_string()
}

fn default_model_name() -> String {
    "llama3.1:8b".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model_timeout() -> u64 {
    60
}

fn default_persist_path() -> PathBuf {
    PathBuf::from("~/.symposium/memory.json")
}

fn default_max_entries() -> usize {
    1000
}

fn default_rounds() -> u32 {
    1
}

fn default_max_retries() -> u32 {
    2
}

fn default_tool_timeout() -> u64 {
    10
}

fn default_max_results() -> usize {
    5
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    256
}

fn default_tools() -> BTreeMap<String, ToolConfig> {
    ["web_search", "calculate", "get_current_info"]
        .into_iter()
        .map(|name| (name.to_string(), ToolConfig::default()))
        .collect()
}

fn default_personas() -> BTreeMap<String, PersonaConfig> {
    let mut personas = BTreeMap::new();
    personas.insert(
        "questioner".to_string(),
        PersonaConfig {
            name: Some("Socrates".to_string()),
            instruction: "You are Socrates. You probe every claim with careful questions \
                          and expose hidden assumptions."
                .to_string(),
            temperature: 0.8,
            max_tokens: 256,
            tools_enabled: false,
        },
    );
    personas.insert(
        "theorist".to_string(),
        PersonaConfig {
            name: Some("Plato".to_string()),
            instruction: "You are Plato. You connect concrete questions to ideal forms \
                          and enduring theory."
                .to_string(),
            temperature: 0.8,
            max_tokens: 256,
            tools_enabled: false,
        },
    );
    personas.insert(
        "practitioner".to_string(),
        PersonaConfig {
            name: Some("Aristotle".to_string()),
            instruction: "You are Aristotle. You ground the discussion in observation, \
                          evidence and practical wisdom."
                .to_string(),
            temperature: 0.7,
            max_tokens: 256,
            tools_enabled: true,
        },
    );
    personas.insert(
        "summarizer".to_string(),
        PersonaConfig {
            name: Some("Summary".to_string()),
            instruction: "You are an impartial moderator closing a philosophical debate."
                .to_string(),
            temperature: 0.5,
            max_tokens: 512,
            tools_enabled: false,
        },
    );
    personas
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            model: ModelConfig::default(),
            memory: MemoryConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            tools: default_tools(),
            personas: default_personas(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.symposium/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse, validate and process configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        // Written before processing so the file keeps the portable ~ paths
        let toml_string = toml::to_string_pretty(&Self::default())
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        let mut config = Self::default();
        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.symposium/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".symposium").join("config.toml"))
    }

    /// Resolve the [`AgentConfig`] for a persona key
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PersonaNotConfigured` when `[personas.<key>]`
    /// is absent. The orchestrator treats this as recoverable and simply
    /// leaves the persona out of the debate.
    pub fn agent_config(&self, key: &str) -> Result<AgentConfig, EngineError> {
        let persona = self
            .personas
            .get(key)
            .ok_or_else(|| EngineError::PersonaNotConfigured(key.to_string()))?;

        Ok(AgentConfig {
            name: persona.name.clone().unwrap_or_else(|| title_case(key)),
            instruction: persona.instruction.clone(),
            temperature: persona.temperature,
            max_tokens: persona.max_tokens,
            tools_enabled: persona.tools_enabled,
        })
    }

    /// Settings for a tool, falling back to defaults for unlisted tools
    pub fn tool_config(&self, name: &str) -> ToolConfig {
        self.tools.get(name).cloned().unwrap_or_default()
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates log level, backend and numeric ranges
    /// - Expands ~ in the memory and log file paths
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if !SUPPORTED_BACKENDS.contains(&self.model.backend.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid backend '{}'. Must be one of: {}",
                self.model.backend,
                SUPPORTED_BACKENDS.join(", ")
            )));
        }

        if self.model.timeout_secs == 0 {
            return Err(EngineError::Config(
                "model.timeout_secs must be a positive integer".to_string(),
            ));
        }

        if self.orchestrator.default_rounds == 0 {
            return Err(EngineError::Config(
                "orchestrator.default_rounds must be a positive integer".to_string(),
            ));
        }

        if self.orchestrator.max_retries == 0 {
            return Err(EngineError::Config(
                "orchestrator.max_retries must be a positive integer".to_string(),
            ));
        }

        if self.memory.max_entries == 0 {
            return Err(EngineError::Config(
                "memory.max_entries must be a positive integer".to_string(),
            ));
        }

        for (key, persona) in &self.personas {
            if !(0.0..=2.0).contains(&persona.temperature) {
                return Err(EngineError::Config(format!(
                    "personas.{}.temperature must be between 0.0 and 2.0",
                    key
                )));
            }
            if persona.max_tokens == 0 {
                return Err(EngineError::Config(format!(
                    "personas.{}.max_tokens must be a positive integer",
                    key
                )));
            }
        }

        self.memory.persist_path = expand_path(&self.memory.persist_path)?;
        if let Some(file) = &self.logging.file {
            self.logging.file = Some(expand_path(file)?);
        }

        Ok(())
    }
}

/// "questioner" -> "Questioner"
fn title_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.model.backend, "ollama");
        assert_eq!(config.orchestrator.default_rounds, 1);
        assert_eq!(config.orchestrator.max_retries, 2);
        assert!(config.orchestrator.random_order);
        assert_eq!(config.memory.max_entries, 1000);
        assert_eq!(config.personas.len(), 4);
        assert_eq!(config.tools.len(), 3);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.model.model_name, "llama3.1:8b");
        assert!(config.personas.contains_key("practitioner"));
    }

    #[test]
    fn test_agent_config_resolution() {
        let config = Config::default();
        let agent = config.agent_config("practitioner").unwrap();
        assert_eq!(agent.name, "Aristotle");
        assert!(agent.tools_enabled);
        assert_eq!(agent.max_tokens, 256);
    }

    #[test]
    fn test_agent_config_name_defaults_to_key() {
        let config = Config::from_toml_str(
            r#"
[personas.theorist]
instruction = "Theorize."
"#,
        )
        .unwrap();

        let agent = config.agent_config("theorist").unwrap();
        assert_eq!(agent.name, "Theorist");
        assert_eq!(agent.temperature, 0.8);
        assert!(!agent.tools_enabled);
    }

    #[test]
    fn test_missing_persona_is_reported() {
        let config = Config::from_toml_str("[personas.theorist]\n").unwrap();
        let err = config.agent_config("questioner").unwrap_err();
        assert!(matches!(err, EngineError::PersonaNotConfigured(ref k) if k == "questioner"));
    }

    #[test]
    fn test_tool_config_fallback() {
        let config = Config::default();
        let tool = config.tool_config("does_not_exist");
        assert!(tool.enabled);
        assert_eq!(tool.timeout_secs, 10);
        assert_eq!(tool.max_results, 5);
    }

    #[test]
    fn test_invalid_backend_rejected() {
        let err = Config::from_toml_str("[model]\nbackend = \"transformers\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid backend"));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = Config::from_toml_str("[orchestrator]\nmax_retries = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn test_resolved_base_url() {
        let mut model = ModelConfig::default();
        assert_eq!(model.resolved_base_url(), "http://localhost:11434");

        model.backend = "openai".to_string();
        assert_eq!(model.resolved_base_url(), "https://api.openai.com/v1");

        model.base_url = Some("http://127.0.0.1:8080/v1/".to_string());
        assert_eq!(model.resolved_base_url(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("test"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/absolute/path");
        let expanded = expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("summarizer"), "Summarizer");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(config.logging.level, deserialized.logging.level);
        assert_eq!(config.orchestrator, deserialized.orchestrator);
        assert_eq!(config.personas, deserialized.personas);
    }
}
