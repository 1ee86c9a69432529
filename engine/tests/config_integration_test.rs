//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be properly loaded from
//! disk, validated, and processed with path expansion.

use std::fs;
use tempfile::TempDir;

use symposium_engine::config::Config;

#[test]
fn test_config_toml_parsing() {
    let toml_content = r#"
[logging]
level = "debug"
console = false

[model]
backend = "openai"
model_name = "gpt-4o-mini"
base_url = "http://localhost:8080/v1"
timeout_secs = 30

[memory]
persist_path = "/tmp/symposium-memory.json"
auto_save = false
max_entries = 50

[orchestrator]
default_rounds = 3
enable_summary = false
random_seed = 7
max_retries = 4
random_order = false

[tools.web_search]
enabled = false

[tools.calculate]
enabled = true

[personas.questioner]
name = "Socrates"
instruction = "Question everything."
temperature = 0.9
max_tokens = 200

[personas.practitioner]
name = "Aristotle"
instruction = "Be practical."
tools_enabled = true
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load_from_path(&config_path).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.console);
    assert_eq!(config.model.backend, "openai");
    assert_eq!(config.model.resolved_base_url(), "http://localhost:8080/v1");
    assert_eq!(config.memory.max_entries, 50);
    assert!(!config.memory.auto_save);
    assert_eq!(config.orchestrator.default_rounds, 3);
    assert_eq!(config.orchestrator.random_seed, Some(7));
    assert!(!config.orchestrator.random_order);
    assert!(!config.tool_config("web_search").enabled);
    assert!(config.tool_config("calculate").enabled);

    // Only the listed personas exist once [personas] is given
    assert_eq!(config.personas.len(), 2);
    let questioner = config.agent_config("questioner").unwrap();
    assert_eq!(questioner.temperature, 0.9);
    assert_eq!(questioner.max_tokens, 200);
    assert!(config.agent_config("theorist").is_err());
}

#[test]
fn test_memory_path_tilde_expanded() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[memory]\npersist_path = \"~/debates/memory.json\"\n").unwrap();

    let config = Config::load_from_path(&config_path).unwrap();
    let home = dirs::home_dir().unwrap();
    assert_eq!(
        config.memory.persist_path,
        home.join("debates").join("memory.json")
    );
}

#[test]
fn test_invalid_log_level() {
    let err = Config::from_toml_str("[logging]\nlevel = \"verbose\"\n").unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_invalid_temperature() {
    let err = Config::from_toml_str(
        "[personas.theorist]\ninstruction = \"x\"\ntemperature = 3.5\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("temperature"));
}

#[test]
fn test_zero_values_rejected() {
    assert!(Config::from_toml_str("[orchestrator]\ndefault_rounds = 0\n").is_err());
    assert!(Config::from_toml_str("[memory]\nmax_entries = 0\n").is_err());
    assert!(Config::from_toml_str("[personas.theorist]\nmax_tokens = 0\n").is_err());
}

#[test]
fn test_missing_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load_from_path(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_malformed_toml() {
    let err = Config::from_toml_str("[model\nbackend = ").unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}
