//! Outcome of a single agent activation.

use super::entities::AgentName;
use serde::{Deserialize, Serialize};

/// What an agent produced when it was activated.
///
/// An activation yields exactly one of these; an answer and a hand-off are
/// never combined. Failures are reported out of band as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// Terminal finding; the swarm completes with this content
    Answer { content: String },
    /// Pass control to another agent, explaining why
    HandOff { target: AgentName, rationale: String },
}

impl AgentOutcome {
    pub fn answer(content: impl Into<String>) -> Self {
        AgentOutcome::Answer {
            content: content.into(),
        }
    }

    pub fn hand_off(target: impl Into<AgentName>, rationale: impl Into<String>) -> Self {
        AgentOutcome::HandOff {
            target: target.into(),
            rationale: rationale.into(),
        }
    }

    /// The text this activation contributes to the report
    pub fn content(&self) -> &str {
        match self {
            AgentOutcome::Answer { content } => content,
            AgentOutcome::HandOff { rationale, .. } => rationale,
        }
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, AgentOutcome::Answer { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentOutcome::Answer { .. } => "answer",
            AgentOutcome::HandOff { .. } => "handoff",
        }
    }
}
