//! In-flight debate that yields frames one step at a time.

use serde_json::json;
use std::collections::VecDeque;
use tracing::info;

use crate::participants::{ReplyOverrides, Role};
use crate::transcript::Turn;

use super::{DebateFrame, DebateOrchestrator, DebateStatus};

enum SessionState {
    /// Nothing recorded yet
    Pending,
    /// Participant turns still to run, in speaking order
    Debating(VecDeque<(u32, Role)>),
    /// Completed frame emitted
    Finished,
}

/// A running debate borrowed from its orchestrator.
///
/// Frames are produced only when pulled, so a slow consumer simply delays
/// the next participant call.
pub struct DebateSession<'a> {
    orchestrator: &'a mut DebateOrchestrator,
    question: String,
    rounds: u32,
    enable_summary: bool,
    overrides: ReplyOverrides,
    history: Vec<Turn>,
    summary: Option<String>,
    state: SessionState,
}

impl<'a> DebateSession<'a> {
    pub(super) fn new(
        orchestrator: &'a mut DebateOrchestrator,
        question: String,
        rounds: u32,
        enable_summary: bool,
        overrides: ReplyOverrides,
    ) -> Self {
        Self {
            orchestrator,
            question,
            rounds,
            enable_summary,
            overrides,
            history: Vec::new(),
            summary: None,
            state: SessionState::Pending,
        }
    }

    /// The trimmed question under debate
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Retrieves the next frame.
    ///
    /// Returns `None` once the completed frame has been emitted.
    pub async fn next_frame(&mut self) -> Option<DebateFrame> {
        match &mut self.state {
            SessionState::Pending => {
                self.history.push(Turn::user(self.question.clone()));
                self.orchestrator
                    .memory
                    .add("initial_question", json!(self.question), "user");

                let mut schedule = VecDeque::new();
                for round in 1..=self.rounds {
                    for role in self.orchestrator.round_order() {
                        schedule.push_back((round, role));
                    }
                }

                // An empty schedule goes straight to the summary on the next pull
                self.state = SessionState::Debating(schedule);

                Some(self.frame(DebateStatus::Started))
            }
            SessionState::Debating(schedule) => match schedule.pop_front() {
                Some((round, role)) => {
                    let turn = self
                        .orchestrator
                        .take_turn(role, &self.question, &self.history, &self.overrides)
                        .await;

                    if let Some((speaker, content)) = turn {
                        info!(round, participant = %speaker, "Participant turn complete");
                        self.history
                            .push(Turn::participant(speaker, content, round));
                    }

                    Some(self.frame(DebateStatus::Debating))
                }
                None => {
                    if self.enable_summary {
                        self.summary = self
                            .orchestrator
                            .summarize(&self.question, &self.history, &self.overrides)
                            .await;

                        if let Some(summary) = &self.summary {
                            self.history.push(Turn::summary(summary.clone()));
                        }
                    }

                    self.state = SessionState::Finished;
                    info!(
                        turns = self.history.len(),
                        summarized = self.summary.is_some(),
                        "Debate completed"
                    );
                    Some(self.frame(DebateStatus::Completed))
                }
            },
            SessionState::Finished => None,
        }
    }

    /// Drive the session to the end and return the completed frame
    pub async fn finish(mut self) -> DebateFrame {
        let mut last = None;
        while let Some(frame) = self.next_frame().await {
            last = Some(frame);
        }
        last.unwrap_or_else(|| self.frame(DebateStatus::Completed))
    }

    fn frame(&self, status: DebateStatus) -> DebateFrame {
        DebateFrame {
            question: self.question.clone(),
            history: self.history.clone(),
            summary: self.summary.clone(),
            error: None,
            status,
        }
    }
}
