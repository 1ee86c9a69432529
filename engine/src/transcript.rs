//! Conversation transcript
//!
//! A debate transcript is an append-only `Vec<Turn>`. The seed turn from the
//! user and the closing summary carry no round number; every participant
//! turn records the round it was spoken in.

use serde::{Deserialize, Serialize};

/// Speaker label of the seed turn
pub const USER_SPEAKER: &str = "User";

/// Speaker label of the closing summary turn
pub const SUMMARY_SPEAKER: &str = "Summary";

/// One utterance in the debate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

impl Turn {
    /// The user's opening question
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: USER_SPEAKER.to_string(),
            content: content.into(),
            round: None,
        }
    }

    /// A participant's turn within a round
    pub fn participant(speaker: impl Into<String>, content: impl Into<String>, round: u32) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            round: Some(round),
        }
    }

    /// The closing summary
    pub fn summary(content: impl Into<String>) -> Self {
        Self {
            speaker: SUMMARY_SPEAKER.to_string(),
            content: content.into(),
            round: None,
        }
    }
}

/// Render turns as `[speaker] content` lines for a prompt
///
/// Turns whose content is blank are skipped. An empty rendering becomes
/// `(No prior conversation)`.
pub fn render_history(transcript: &[Turn]) -> String {
    let lines: Vec<String> = transcript
        .iter()
        .filter_map(|turn| {
            let content = turn.content.trim();
            (!content.is_empty()).then(|| format!("[{}] {}", turn.speaker, content))
        })
        .collect();

    if lines.is_empty() {
        "(No prior conversation)".to_string()
    } else {
        lines.join("\n")
    }
}
