//! Shared persona behavior: prompt assembly, generation, reply cleanup

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{GenerationRequest, LLMError, TextGenerator};
use crate::memory::MemoryStore;
use crate::transcript::{render_history, Turn};

use super::{ReplyOverrides, Role};

/// Number of memory entries rendered into a prompt
pub const MEMORY_PROMPT_LIMIT: usize = 5;

/// State and helpers every participant is built on
pub struct PersonaCore {
    role: Role,
    config: AgentConfig,
    system_prompt: String,
    generator: Arc<dyn TextGenerator>,
}

impl PersonaCore {
    /// `directive` is appended to the persona instruction on its own line
    pub fn new(
        role: Role,
        config: AgentConfig,
        generator: Arc<dyn TextGenerator>,
        directive: &str,
    ) -> Self {
        let system_prompt = format!("{}\n{}", config.instruction, directive);
        Self {
            role,
            config,
            system_prompt,
            generator,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Assemble the standard debate prompt
    ///
    /// The memory section is only present when a non-empty store is given.
    pub fn build_prompt(
        &self,
        question: &str,
        transcript: &[Turn],
        memory: Option<&MemoryStore>,
    ) -> String {
        let mut parts: Vec<String> = vec![
            self.system_prompt.clone(),
            String::new(),
            "## Conversation History:".to_string(),
            render_history(transcript),
        ];

        if let Some(memory) = memory.filter(|m| !m.is_empty()) {
            parts.push(String::new());
            parts.push("## Relevant Context:".to_string());
            parts.push(memory.render(MEMORY_PROMPT_LIMIT));
        }

        parts.push(String::new());
        parts.push("## Current Question:".to_string());
        parts.push(question.to_string());
        parts.extend(self.speaker_cue());

        parts.join("\n")
    }

    /// Closing lines that hand the floor to this persona
    pub fn speaker_cue(&self) -> [String; 3] {
        [
            String::new(),
            format!("## Your Response as {}:", self.config.name),
            format!("{}:", self.config.name),
        ]
    }

    /// Call the generator with persona settings, overrides winning
    pub async fn generate(
        &self,
        prompt: String,
        overrides: &ReplyOverrides,
    ) -> Result<String, LLMError> {
        let request = GenerationRequest {
            prompt,
            temperature: overrides.temperature.unwrap_or(self.config.temperature),
            max_tokens: overrides.max_tokens.unwrap_or(self.config.max_tokens),
        };

        tracing::debug!(
            persona = %self.config.name,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "Generating reply"
        );

        self.generator.generate(&request).await
    }

    /// Remove a leading speaker label (case-insensitive) and trim
    pub fn clean_reply(&self, raw: &str) -> String {
        strip_speaker_prefix(raw.trim(), &self.config.name, false)
            .trim()
            .to_string()
    }

    /// Build the prompt, generate and clean
    pub async fn default_reply(
        &self,
        question: &str,
        transcript: &[Turn],
        memory: Option<&MemoryStore>,
        overrides: &ReplyOverrides,
    ) -> Result<String, LLMError> {
        let prompt = self.build_prompt(question, transcript, memory);
        let raw = self.generate(prompt, overrides).await?;
        let reply = self.clean_reply(&raw);

        tracing::debug!(persona = %self.config.name, chars = reply.len(), "Persona replied");
        Ok(reply)
    }
}

/// Strip `{name}:` or `[{name}]` from the front of `text`
///
/// Only the first matching label is removed.
pub fn strip_speaker_prefix<'a>(text: &'a str, name: &str, case_sensitive: bool) -> &'a str {
    for prefix in [format!("{}:", name), format!("[{}]", name)] {
        let Some(head) = text.get(..prefix.len()) else {
            continue;
        };

        let matches = if case_sensitive {
            head == prefix
        } else {
            head.to_lowercase() == prefix.to_lowercase()
        };

        if matches {
            return &text[prefix.len()..];
        }
    }
    text
}
