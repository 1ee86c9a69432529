//! Practical persona with tool assistance
//!
//! Before answering, the practitioner checks whether the user asked for
//! something a tool can supply (a calculation, a lookup, the date). If so,
//! it runs that tool, stores the result in memory and answers with the
//! result appended to the question. Every non-empty answer is also stored
//! in memory as an insight.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::llm::{LLMError, TextGenerator};
use crate::memory::MemoryStore;
use crate::tools::{detect_tool, extract_query, should_use_tools, ToolRegistry};
use crate::transcript::Turn;

use super::{Participant, PersonaCore, ReplyOverrides, Role};

const TOOLS_NOTE: &str = " You may rely on external information you gathered via tools.";

pub struct Practitioner {
    core: PersonaCore,
    tools: Arc<ToolRegistry>,
}

impl Practitioner {
    pub fn new(
        config: AgentConfig,
        generator: Arc<dyn TextGenerator>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let mut directive = Role::Practitioner.directive().to_string();
        if config.tools_enabled {
            directive.push_str(TOOLS_NOTE);
        }

        Self {
            core: PersonaCore::new(Role::Practitioner, config, generator, &directive),
            tools,
        }
    }

    /// Run the selected tool, if any, and return the augmented question
    async fn consult_tools(
        &self,
        question: &str,
        transcript: &[Turn],
        memory: Option<&mut MemoryStore>,
    ) -> Option<String> {
        let tools_enabled = self.core.config().tools_enabled;
        if !should_use_tools(tools_enabled, transcript, question) {
            return None;
        }

        let tool = detect_tool(question, tools_enabled)?;
        let query = extract_query(tool, question);

        tracing::info!(persona = %self.core.name(), tool = %tool, query = %query, "Using tool");
        let result = self.tools.dispatch(tool.name(), &query).await;

        if let Some(memory) = memory {
            memory.add(
                format!("tool_{}_{}", tool.name(), transcript.len()),
                Value::String(result.clone()),
                self.core.name(),
            );
        }

        Some(format!(
            "{}\n\n[Tool {} Result]: {}\nUse this information to craft a practical recommendation. \
             Use it directly; do not ask permission.",
            question,
            tool.name(),
            result
        ))
    }
}

#[async_trait]
impl Participant for Practitioner {
    fn role(&self) -> Role {
        Role::Practitioner
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
        mut memory: Option<&mut MemoryStore>,
        overrides: &ReplyOverrides,
    ) -> Result<String, LLMError> {
        let prompt_question = self
            .consult_tools(question, transcript, memory.as_deref_mut())
            .await
            .unwrap_or_else(|| question.to_string());

        let reply = self
            .core
            .default_reply(&prompt_question, transcript, memory.as_deref(), overrides)
            .await?;

        if let Some(memory) = memory {
            if !reply.is_empty() {
                memory.add(
                    format!(
                        "{}_insight_{}",
                        self.core.name().to_lowercase(),
                        transcript.len()
                    ),
                    Value::String(reply.clone()),
                    self.core.name(),
                );
            }
        }

        Ok(reply)
    }
}
