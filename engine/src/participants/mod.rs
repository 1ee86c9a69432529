//! Debate participants
//!
//! Every persona in a debate implements [`Participant`]. The set of roles is
//! closed ([`Role`]): a questioner, a theorist, a practitioner that may
//! consult tools, and a summarizer that closes the debate. All of them share
//! the prompt assembly and reply cleanup in [`base`]; they differ in their
//! behavioral directive and, for the practitioner and summarizer, in how the
//! reply is produced.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{LLMError, TextGenerator};
use crate::memory::MemoryStore;
use crate::tools::ToolRegistry;
use crate::transcript::Turn;

pub mod base;
pub mod persona;
pub mod practitioner;
pub mod summarizer;

pub use base::PersonaCore;
pub use persona::Persona;
pub use practitioner::Practitioner;
pub use summarizer::Summarizer;

/// Debate roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Questioner,
    Theorist,
    Practitioner,
    Summarizer,
}

impl Role {
    /// Roles that speak during the rounds, in base order
    pub const DEBATERS: [Role; 3] = [Role::Questioner, Role::Theorist, Role::Practitioner];

    /// Every role, in registration order
    pub const ALL: [Role; 4] = [
        Role::Questioner,
        Role::Theorist,
        Role::Practitioner,
        Role::Summarizer,
    ];

    /// Key of the `[personas.<key>]` table
    pub fn config_key(&self) -> &'static str {
        match self {
            Role::Questioner => "questioner",
            Role::Theorist => "theorist",
            Role::Practitioner => "practitioner",
            Role::Summarizer => "summarizer",
        }
    }

    /// Behavioral directive appended to the persona instruction
    pub fn directive(&self) -> &'static str {
        match self {
            Role::Questioner => {
                "Ask exactly one concise clarifying question that challenges the premise."
            }
            Role::Theorist => {
                "Offer one insightful comment tying the topic to philosophical theory or frameworks."
            }
            Role::Practitioner => {
                "Provide one practical, actionable recommendation. Do not ask permission to use \
                 tools; if you have tool results, use them directly."
            }
            Role::Summarizer => {
                "Summarize the discussion clearly, list 2-3 key takeaways, and note any open \
                 questions."
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Per-call generation overrides; unset fields fall back to the persona config
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReplyOverrides {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A persona taking part in a debate
#[async_trait]
pub trait Participant: Send + Sync {
    /// Display name, also used as the transcript speaker
    fn name(&self) -> &str {
        &self.config().name
    }

    fn role(&self) -> Role;

    fn config(&self) -> &AgentConfig;

    /// Persona instruction followed by the role directive
    fn system_prompt(&self) -> &str;

    /// Produce this persona's next contribution
    ///
    /// `transcript` is everything said so far. `memory`, when given, is
    /// rendered into the prompt and may be written to.
    async fn reply(
        &self,
        question: &str,
        transcript: &[Turn],
        memory: Option<&mut MemoryStore>,
        overrides: &ReplyOverrides,
    ) -> Result<String, LLMError>;
}

/// Build the participant implementing `role`
pub fn build_participant(
    role: Role,
    config: AgentConfig,
    generator: Arc<dyn TextGenerator>,
    tools: Arc<ToolRegistry>,
) -> Box<dyn Participant> {
    match role {
        Role::Questioner | Role::Theorist => Box::new(Persona::new(role, config, generator)),
        Role::Practitioner => Box::new(Practitioner::new(config, generator, tools)),
        Role::Summarizer => Box::new(Summarizer::new(config, generator)),
    }
}
