//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - ask: Run a debate (one-shot or interactive)
//! - memory: Show, search, read or clear the memory store
//! - tools: List registered tools
//! - doctor: Validate configuration and check the model backend

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::MemoryAction;
use crate::config::Config;
use crate::llm::build_generator;
use crate::memory::{MemoryEntry, MemoryStore};
use crate::orchestrator::{
    build_orchestrator, DebateFrame, DebateOptions, DebateOrchestrator, DebateStatus,
};
use crate::participants::Role;
use crate::tools::ToolRegistry;
use crate::transcript::Turn;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Debate a question
///
/// With a question, runs one debate and prints it. Without one, reads
/// questions from stdin until `quit`, `exit` or end of input; memory
/// carries over between questions.
pub async fn handle_ask(
    question: Option<String>,
    rounds: Option<u32>,
    no_summary: bool,
    stream: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let mut orchestrator =
        build_orchestrator(config).context("Failed to initialize debate orchestrator")?;

    let options = DebateOptions {
        rounds,
        enable_summary: no_summary.then_some(false),
        ..DebateOptions::default()
    };

    match question {
        Some(question) => run_debate(&mut orchestrator, &question, options, stream, format).await,
        None => interactive_loop(&mut orchestrator, options, stream, format).await,
    }
}

async fn interactive_loop(
    orchestrator: &mut DebateOrchestrator,
    options: DebateOptions,
    stream: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Symposium interactive mode. Type 'quit' or 'exit' to leave.");

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            break;
        }

        run_debate(orchestrator, question, options, stream, format).await?;
    }

    println!("Goodbye.");
    Ok(())
}

fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "quit" | "exit")
}

async fn run_debate(
    orchestrator: &mut DebateOrchestrator,
    question: &str,
    options: DebateOptions,
    stream: bool,
    format: OutputFormat,
) -> Result<()> {
    if !stream {
        let frame = orchestrator
            .run(question, options)
            .await
            .context("Debate failed")?;

        match format {
            OutputFormat::Text => println!("{}", render_frame_text(&frame)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frame)?),
        }
        return Ok(());
    }

    let mut session = orchestrator
        .stream(question, options)
        .context("Debate failed")?;

    while let Some(frame) = session.next_frame().await {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&frame)?),
            OutputFormat::Text => match frame.status {
                DebateStatus::Started => println!("Question: {}\n", frame.question),
                DebateStatus::Debating => {
                    if let Some(turn) = frame.history.last() {
                        println!("{}\n", format_turn(turn));
                    }
                }
                DebateStatus::Completed => {
                    if let Some(summary) = &frame.summary {
                        println!("Summary:\n{}", summary);
                    }
                }
            },
        }
    }

    Ok(())
}

/// `[Speaker] (round N) content`
fn format_turn(turn: &Turn) -> String {
    match turn.round {
        Some(round) => format!("[{}] (round {}) {}", turn.speaker, round, turn.content),
        None => format!("[{}] {}", turn.speaker, turn.content),
    }
}

/// Human-readable rendering of a completed debate
fn render_frame_text(frame: &DebateFrame) -> String {
    let mut out = vec![format!("Question: {}", frame.question), String::new()];

    for turn in frame
        .history
        .iter()
        .filter(|turn| turn.round.is_some())
    {
        out.push(format_turn(turn));
        out.push(String::new());
    }

    if let Some(summary) = &frame.summary {
        out.push("Summary:".to_string());
        out.push(summary.clone());
    }

    out.join("\n").trim_end().to_string()
}

/// Inspect or clear the memory store
pub async fn handle_memory(action: MemoryAction, config: &Config, format: OutputFormat) -> Result<()> {
    let mut memory = MemoryStore::from_config(&config.memory);

    match action {
        MemoryAction::Show { limit } => {
            let entries = memory.recent(limit);
            print_entries(&entries, memory.len(), format)?;
        }
        MemoryAction::Search { query, limit } => {
            let entries = memory.search(&query, limit);
            print_entries(&entries, entries.len(), format)?;
        }
        MemoryAction::Get { key } => match (memory.entry(&key), format) {
            (Some(entry), OutputFormat::Text) => {
                println!("{}: {}", entry.key, entry.value_text());
                println!("  Source: {}", entry.source);
                println!("  Timestamp: {}", entry.timestamp);
            }
            (Some(entry), OutputFormat::Json) => {
                println!("{}", serde_json::to_string_pretty(entry)?);
            }
            (None, OutputFormat::Text) => println!("No memory entry for '{}'", key),
            (None, OutputFormat::Json) => println!("{}", json!({ "key": key, "found": false })),
        },
        MemoryAction::Clear => {
            let removed = memory.len();
            memory.clear();
            memory
                .try_save()
                .context("Failed to write cleared memory file")?;

            match format {
                OutputFormat::Text => println!("Cleared {} memory entries", removed),
                OutputFormat::Json => println!("{}", json!({ "cleared": removed })),
            }
        }
    }

    Ok(())
}

fn print_entries(entries: &[&MemoryEntry], total: usize, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No memory entries");
                return Ok(());
            }

            println!("Memory ({} of {} entries):", entries.len(), total);
            println!();
            for entry in entries {
                println!("{}", entry.key);
                println!("  Value: {}", entry.value_text());
                println!("  Source: {}", entry.source);
                println!("  Timestamp: {}", entry.timestamp);
                println!();
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "entries": entries,
                "count": entries.len(),
                "total": total
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

/// List available tools
pub async fn handle_tools(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = ToolRegistry::from_config(config).context("Failed to initialize tools")?;

    match format {
        OutputFormat::Text => {
            if registry.is_empty() {
                println!("No tools enabled");
                return Ok(());
            }
            println!("Available tools:");
            for (name, description) in registry.descriptions() {
                println!("  {:<18} {}", name, description);
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "tools": registry.descriptions().iter().map(|(name, description)| {
                    json!({ "name": name, "description": description })
                }).collect::<Vec<_>>(),
                "count": registry.len()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Run system diagnostics
pub async fn handle_doctor(
    config: &Config,
    config_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks: Vec<(String, String)> = Vec::new();

    // Config is already validated when loaded
    checks.push(("Configuration".to_string(), "Valid".to_string()));
    checks.push((
        "Config file".to_string(),
        config_path.display().to_string(),
    ));

    // Model backend
    checks.push((
        "Model".to_string(),
        format!("{} ({})", config.model.model_name, config.model.backend),
    ));
    match build_generator(&config.model) {
        Ok(generator) => {
            if generator.check_health().await {
                checks.push(("Model backend".to_string(), "Reachable".to_string()));
            } else {
                checks.push(("Model backend".to_string(), "Not reachable".to_string()));
                issues.push(format!(
                    "Cannot reach {} at {}. Is it running?",
                    config.model.backend,
                    config.model.resolved_base_url()
                ));
            }
        }
        Err(e) => {
            checks.push(("Model backend".to_string(), "Error".to_string()));
            issues.push(format!("Cannot create model backend: {}", e));
        }
    }

    // Personas
    for role in Role::ALL {
        match config.agent_config(role.config_key()) {
            Ok(agent) => checks.push((format!("Persona {}", role), agent.name)),
            Err(_) => {
                checks.push((format!("Persona {}", role), "Missing".to_string()));
                issues.push(format!(
                    "Persona '{}' is not configured and will not take part",
                    role
                ));
            }
        }
    }

    // Memory file
    if !config.memory.persist {
        checks.push(("Memory".to_string(), "In-memory only".to_string()));
    } else if config.memory.persist_path.exists() {
        match std::fs::read_to_string(&config.memory.persist_path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).map_err(Into::into))
        {
            Ok(_) => checks.push(("Memory file".to_string(), "OK".to_string())),
            Err(e) => {
                checks.push(("Memory file".to_string(), "Unreadable".to_string()));
                issues.push(format!(
                    "Memory file {} cannot be parsed and will be ignored: {}",
                    config.memory.persist_path.display(),
                    e
                ));
            }
        }
    } else {
        checks.push(("Memory file".to_string(), "Not created yet".to_string()));
    }

    // Tools
    match ToolRegistry::from_config(config) {
        Ok(registry) => checks.push(("Tools".to_string(), registry.names().join(", "))),
        Err(e) => {
            checks.push(("Tools".to_string(), "Error".to_string()));
            issues.push(format!("Cannot initialize tools: {}", e));
        }
    }

    // Output results
    match format {
        OutputFormat::Text => {
            println!("Symposium System Diagnostics");
            println!("============================");
            println!();

            println!("System Checks:");
            for (check, status) in &checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
