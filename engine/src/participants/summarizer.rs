//! Closing summarizer
//!
//! Sees the original question and the full transcript, never memory, and
//! keeps its reply multi-line: every non-blank line survives.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{LLMError, TextGenerator};
use crate::memory::MemoryStore;
use crate::transcript::{render_history, Turn};

use super::base::strip_speaker_prefix;
use super::{Participant, PersonaCore, ReplyOverrides, Role};

pub struct Summarizer {
    core: PersonaCore,
}

impl Summarizer {
    pub fn new(config: AgentConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            core: PersonaCore::new(
                Role::Summarizer,
                config,
                generator,
                Role::Summarizer.directive(),
            ),
        }
    }

    /// Prompt over the original question and the whole conversation
    pub fn build_prompt(&self, question: &str, transcript: &[Turn]) -> String {
        let mut parts = vec![
            self.core.system_prompt().to_string(),
            String::new(),
            "## Original Question:".to_string(),
            question.to_string(),
            String::new(),
            "## Full Conversation:".to_string(),
            render_history(transcript),
        ];
        parts.extend(self.core.speaker_cue());
        parts.join("\n")
    }

    /// Strip the speaker label (exact case) and drop blank lines
    pub fn clean_reply(&self, raw: &str) -> String {
        strip_speaker_prefix(raw.trim(), self.core.name(), true)
            .trim()
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Participant for Summarizer {
    fn role(&self) -> Role {
        Role::Summarizer
    }

    fn config(&self) -> &AgentConfig {
        self.core.config()
    }

    fn system_prompt(&self) -> &str {
        self.core.system_prompt()
    }

    async fn reply(
        &self,
        question: &str,
        transcript: &[Turn],
        _memory: Option<&mut MemoryStore>,
        overrides: &ReplyOverrides,
    ) -> Result<String, LLMError> {
        let prompt = self.build_prompt(question, transcript);
        let raw = self.core.generate(prompt, overrides).await?;
        Ok(self.clean_reply(&raw))
    }
}
