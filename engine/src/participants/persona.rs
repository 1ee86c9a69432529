//! Plain conversational personas (questioner and theorist)

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{LLMError, TextGenerator};
use crate::memory::MemoryStore;
use crate::transcript::Turn;

use super::{Participant, PersonaCore, ReplyOverrides, Role};

/// A persona that only talks: the default reply path with its role directive
pub struct Persona {
    core: PersonaCore,
}

impl Persona {
    pub fn new(role: Role, config: AgentConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            core: PersonaCore::new(role, config, generator, role.directive()),
        }
    }
}

#[async_trait]
impl Participant for Persona {
    fn role(&self) -> Role {
        self.core.role()
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
        memory: Option<&mut MemoryStore>,
        overrides: &ReplyOverrides,
    ) -> Result<String, LLMError> {
        self.core
            .default_reply(question, transcript, memory.as_deref(), overrides)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participants::base::test_support::RecordingGenerator;

    fn config(name: &str) -> AgentConfig {
        AgentConfig {
            name: name.to_string(),
            instruction: format!("You are {}.", name),
            temperature: 0.8,
            max_tokens: 256,
            tools_enabled: false,
        }
    }

    #[test]
    fn test_questioner_directive() {
        let persona = Persona::new(
            Role::Questioner,
            config("Socrates"),
            Arc::new(RecordingGenerator::new("")),
        );
        assert_eq!(persona.name(), "Socrates");
        assert_eq!(
            persona.system_prompt(),
            "You are Socrates.\nAsk exactly one concise clarifying question that challenges the premise."
        );
    }

    #[test]
    fn test_theorist_directive() {
        let persona = Persona::new(
            Role::Theorist,
            config("Plato"),
            Arc::new(RecordingGenerator::new("")),
        );
        assert_eq!(persona.role(), Role::Theorist);
        assert!(persona
            .system_prompt()
            .ends_with("tying the topic to philosophical theory or frameworks."));
    }

    #[tokio::test]
    async fn test_reply_does_not_write_memory() {
        let generator = Arc::new(RecordingGenerator::new("[Plato] The Forms."));
        let persona = Persona::new(Role::Theorist, config("Plato"), generator.clone());
        let mut memory = MemoryStore::new(10);

        let reply = persona
            .reply("What is beauty?", &[], Some(&mut memory), &ReplyOverrides::default())
            .await
            .unwrap();

        assert_eq!(reply, "The Forms.");
        assert!(memory.is_empty());
        assert!(generator.last_prompt().ends_with("## Your Response as Plato:\nPlato:"));
    }
}
