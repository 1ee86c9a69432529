//! Tool-dispatch heuristic
//!
//! The practical participant never asks the model which tool to call.
//! Instead it scans the user's text with fixed keyword and pattern rules:
//!
//! 1. [`should_use_tools`] decides whether the latest user message signals
//!    intent at all.
//! 2. [`detect_tool`] picks one tool for the current question.
//! 3. [`extract_query`] derives the argument passed to that tool.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::transcript::Turn;

/// Words that make a user message worth a tool lookup
const INTENT_KEYWORDS: &[&str] = &[
    "how",
    "plan",
    "steps",
    "action",
    "strategy",
    "research",
    "find",
    "search",
    "calculate",
    "current",
    "information about",
    "tell me about",
    "find out",
    "explain",
];

/// Words that route a question to web search
const SEARCH_KEYWORDS: &[&str] = &[
    "search",
    "look up",
    "find",
    "google",
    "browse",
    "research",
    "information about",
    "tell me about",
    "find out",
    "explain",
];

/// Words that route a question to the clock
const TEMPORAL_KEYWORDS: &[&str] = &["current", "today", "now", "date", "time"];

const QUESTION_WORDS: &[&str] = &["what", "who", "where", "when", "why", "how"];

const FRAGMENT_STARTERS: &[&str] = &[
    "what", "who", "where", "when", "why", "how", "is", "are", "can",
];

/// A digit immediately followed by an operator
static INLINE_MATH: OnceLock<Regex> = OnceLock::new();
/// digit, operator or parenthesis, digit
static FULL_EXPRESSION: OnceLock<Regex> = OnceLock::new();
/// Contiguous arithmetic characters
static EXPRESSION_RUN: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

fn inline_math() -> &'static Regex {
    INLINE_MATH.get_or_init(|| Regex::new(r"\d+[+\-*/%]").expect("Invalid inline math pattern"))
}

fn full_expression() -> &'static Regex {
    FULL_EXPRESSION
        .get_or_init(|| Regex::new(r"\d+[+\-*/%()]\d+").expect("Invalid expression pattern"))
}

fn expression_run() -> &'static Regex {
    EXPRESSION_RUN
        .get_or_init(|| Regex::new(r"[0-9+\-*/%().\s]+").expect("Invalid expression run pattern"))
}

fn sentence_end() -> &'static Regex {
    SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]+").expect("Invalid sentence pattern"))
}

/// Tools the heuristic can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Calculate,
    WebSearch,
    CurrentInfo,
}

impl ToolKind {
    /// Registry name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Calculate => "calculate",
            ToolKind::WebSearch => "web_search",
            ToolKind::CurrentInfo => "get_current_info",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Does the latest user message (or the question) signal tool intent?
///
/// Always false when tools are disabled for the persona.
pub fn should_use_tools(tools_enabled: bool, transcript: &[Turn], question: &str) -> bool {
    if !tools_enabled {
        return false;
    }

    let latest_user = transcript
        .iter()
        .rev()
        .find(|turn| turn.speaker.to_lowercase() == "user")
        .map(|turn| turn.content.as_str())
        .unwrap_or(question);

    let text = latest_user.to_lowercase();
    INTENT_KEYWORDS.iter().any(|kw| text.contains(kw)) || inline_math().is_match(&text)
}

/// Pick the tool for `question`, first matching rule wins
pub fn detect_tool(question: &str, tools_enabled: bool) -> Option<ToolKind> {
    if !tools_enabled {
        return None;
    }

    let text = question.to_lowercase();

    if full_expression().is_match(&text) {
        return Some(ToolKind::Calculate);
    }

    if SEARCH_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return Some(ToolKind::WebSearch);
    }

    if TEMPORAL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return Some(ToolKind::CurrentInfo);
    }

    if text.chars().any(|c| c.is_ascii_digit()) {
        return Some(ToolKind::Calculate);
    }

    if QUESTION_WORDS.iter().any(|qw| text.starts_with(qw)) {
        return Some(ToolKind::WebSearch);
    }

    None
}

/// Derive the tool argument from the raw question
pub fn extract_query(tool: ToolKind, question: &str) -> String {
    match tool {
        ToolKind::Calculate => longest_expression(question)
            .unwrap_or_else(|| question_fragment(question)),
        ToolKind::CurrentInfo => {
            let text = question.to_lowercase();
            if text.contains("time") {
                "time".to_string()
            } else if text.contains("date") || text.contains("today") {
                "date".to_string()
            } else {
                "datetime".to_string()
            }
        }
        ToolKind::WebSearch => question_fragment(question),
    }
}

/// Longest run of arithmetic characters, trimmed; None if only whitespace
fn longest_expression(question: &str) -> Option<String> {
    expression_run()
        .find_iter(question)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .max_by_key(|s| s.len())
        .map(str::to_string)
}

/// The sentence most likely to be the actual question
fn question_fragment(question: &str) -> String {
    let fragments: Vec<&str> = sentence_end()
        .split(question)
        .map(str::trim)
        .collect();

    if let Some(found) = fragments.iter().find(|fragment| {
        let lower = fragment.to_lowercase();
        FRAGMENT_STARTERS.iter().any(|w| lower.starts_with(w))
    }) {
        return found.to_string();
    }

    fragments
        .iter()
        .rev()
        .find(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.to_string())
        .unwrap_or_else(|| question.trim().to_string())
}
