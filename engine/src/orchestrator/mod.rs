//! Debate orchestration
//!
//! The [`DebateOrchestrator`] owns the participants, the shared memory and
//! the random source used for turn ordering. A debate runs as a small state
//! machine, `started → debating* → completed`, exposed through a pull-based
//! [`DebateSession`]: each call to [`DebateSession::next_frame`] performs at
//! most one participant turn and returns a snapshot of the transcript.
//!
//! Only an empty question fails a debate. A participant that keeps failing
//! contributes an error sentinel to the transcript, and a failed summary is
//! logged and left out.
//!
//! # Examples
//!
//! ```no_run
//! use symposium_engine::config::Config;
//! use symposium_engine::orchestrator::{build_orchestrator, DebateOptions};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! let mut orchestrator = build_orchestrator(&config)?;
//!
//! let mut session = orchestrator.stream("What is justice?", DebateOptions::default())?;
//! while let Some(frame) = session.next_frame().await {
//!     if let Some(turn) = frame.history.last() {
//!         println!("[{}] {}", turn.speaker, turn.content);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, OrchestratorConfig};
use crate::llm::{build_generator, TextGenerator};
use crate::memory::{MemoryEntry, MemorySnapshot, MemoryStore};
use crate::participants::{build_participant, Participant, ReplyOverrides, Role};
use crate::tools::ToolRegistry;
use crate::transcript::Turn;

mod session;

pub use session::DebateSession;

/// Debate lifecycle stage reported in each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    Started,
    Debating,
    Completed,
}

impl fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebateStatus::Started => write!(f, "started"),
            DebateStatus::Debating => write!(f, "debating"),
            DebateStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Snapshot of a debate; the last frame of a stream is the debate result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateFrame {
    pub question: String,
    pub history: Vec<Turn>,
    pub summary: Option<String>,
    pub error: Option<String>,
    pub status: DebateStatus,
}

/// Per-debate overrides of the orchestrator config
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebateOptions {
    /// Number of rounds; `None` or `Some(0)` uses `default_rounds`
    pub rounds: Option<u32>,

    /// Whether to summarize; `None` uses `enable_summary`
    pub enable_summary: Option<bool>,

    /// Generation overrides applied to every participant call
    pub overrides: ReplyOverrides,
}

/// Runs debates among the configured participants
pub struct DebateOrchestrator {
    config: OrchestratorConfig,
    participants: BTreeMap<Role, Box<dyn Participant>>,
    memory: MemoryStore,
    rng: StdRng,
}

impl DebateOrchestrator {
    /// Build an orchestrator from config with an explicit generator and tools
    ///
    /// Personas missing from `[personas]` are left out with a warning. When
    /// `memory` is `None`, the store is built from `[memory]`.
    pub fn new(
        config: &Config,
        generator: Arc<dyn TextGenerator>,
        tools: Arc<ToolRegistry>,
        memory: Option<MemoryStore>,
    ) -> Self {
        let mut participants: Vec<Box<dyn Participant>> = Vec::new();

        for role in Role::ALL {
            match config.agent_config(role.config_key()) {
                Ok(agent_config) => participants.push(build_participant(
                    role,
                    agent_config,
                    Arc::clone(&generator),
                    Arc::clone(&tools),
                )),
                Err(e) => warn!(role = %role, "Skipping persona: {}", e),
            }
        }

        let memory = memory.unwrap_or_else(|| MemoryStore::from_config(&config.memory));

        Self::from_parts(config.orchestrator.clone(), participants, memory)
    }

    /// Build an orchestrator from ready-made participants
    ///
    /// A later participant with the same role replaces an earlier one.
    pub fn from_parts(
        config: OrchestratorConfig,
        participants: Vec<Box<dyn Participant>>,
        memory: MemoryStore,
    ) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let participants: BTreeMap<Role, Box<dyn Participant>> = participants
            .into_iter()
            .map(|participant| (participant.role(), participant))
            .collect();

        debug!(
            participants = participants.len(),
            seed = ?config.random_seed,
            "Orchestrator ready"
        );

        Self {
            config,
            participants,
            memory,
            rng,
        }
    }

    /// Start a debate and return a session to pull frames from
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for an empty or whitespace-only
    /// question. Nothing is recorded in that case.
    pub fn stream(
        &mut self,
        question: &str,
        options: DebateOptions,
    ) -> Result<DebateSession<'_>, EngineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(EngineError::Validation("Question cannot be empty".to_string()));
        }

        let rounds = match options.rounds {
            Some(r) if r > 0 => r,
            _ => self.config.default_rounds,
        };
        let enable_summary = options.enable_summary.unwrap_or(self.config.enable_summary);

        info!(rounds, enable_summary, "Starting debate");

        Ok(DebateSession::new(
            self,
            question.to_string(),
            rounds,
            enable_summary,
            options.overrides,
        ))
    }

    /// Run a debate to completion and return the final frame
    pub async fn run(
        &mut self,
        question: &str,
        options: DebateOptions,
    ) -> Result<DebateFrame, EngineError> {
        let session = self.stream(question, options)?;
        Ok(session.finish().await)
    }

    /// Speaking order for one round
    fn round_order(&mut self) -> Vec<Role> {
        let mut order: Vec<Role> = Role::DEBATERS
            .into_iter()
            .filter(|role| self.participants.contains_key(role))
            .collect();

        if self.config.random_order {
            order.shuffle(&mut self.rng);
        }
        order
    }

    /// One participant turn with retries; returns `(speaker, content)`
    ///
    /// After `max_retries` failures the content is an error sentinel.
    async fn take_turn(
        &mut self,
        role: Role,
        question: &str,
        transcript: &[Turn],
        overrides: &ReplyOverrides,
    ) -> Option<(String, String)> {
        let participant = self.participants.get(&role)?;
        let name = participant.name().to_string();
        let attempts = self.config.max_retries.max(1);

        for attempt in 1..=attempts {
            match participant
                .reply(question, transcript, Some(&mut self.memory), overrides)
                .await
            {
                Ok(content) => return Some((name, content)),
                Err(e) => warn!(
                    participant = %name,
                    attempt,
                    max_attempts = attempts,
                    "Participant reply failed: {}",
                    e
                ),
            }
        }

        Some((
            name.clone(),
            format!("[Error: {} failed after {} attempts]", name, attempts),
        ))
    }

    /// Single summary attempt; failures are logged and yield `None`
    async fn summarize(
        &mut self,
        question: &str,
        transcript: &[Turn],
        overrides: &ReplyOverrides,
    ) -> Option<String> {
        let summarizer = self.participants.get(&Role::Summarizer)?;

        match summarizer.reply(question, transcript, None, overrides).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!(participant = %summarizer.name(), "Summary generation failed: {}", e);
                None
            }
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Registered participants in role order
    pub fn participants(&self) -> impl Iterator<Item = &dyn Participant> {
        self.participants.values().map(|p| p.as_ref())
    }

    pub fn participant(&self, role: Role) -> Option<&dyn Participant> {
        self.participants.get(&role).map(|p| p.as_ref())
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        &mut self.memory
    }

    pub fn get_memory(&self, key: &str) -> Option<&Value> {
        self.memory.get(key)
    }

    pub fn search_memory(&self, query: &str, limit: usize) -> Vec<&MemoryEntry> {
        self.memory.search(query, limit)
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    pub fn snapshot_memory(&self) -> MemorySnapshot {
        self.memory.snapshot()
    }
}

/// Build an orchestrator entirely from config
///
/// Creates the generator named by `[model]`, the tools enabled under
/// `[tools]`, and the memory store described by `[memory]`.
pub fn build_orchestrator(config: &Config) -> Result<DebateOrchestrator, EngineError> {
    let generator = build_generator(&config.model)?;
    let tools = Arc::new(ToolRegistry::from_config(config)?);

    info!(
        backend = %config.model.backend,
        model = %config.model.model_name,
        tools = tools.len(),
        "Building orchestrator"
    );

    Ok(DebateOrchestrator::new(config, generator, tools, None))
}
