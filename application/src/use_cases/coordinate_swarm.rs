//! Coordinate Swarm use case
//!
//! Drives the hand-off state machine over a fixed set of agents. Control is
//! a baton: one agent runs at a time, and the coordinator is the only writer
//! of swarm state and history.

use crate::ports::progress::SwarmProgressNotifier;
use crate::ports::swarm_agent::{AgentError, SwarmAgent};
use sherlock_domain::{
    AgentName, AgentOutcome, ExecutionHistory, HandOffResult, HistoryEntry, SharedContext,
    SwarmState, TransitionError,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};

/// Errors that end a swarm run as `Failed`
#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("Swarm has no agents")]
    NoAgents,

    #[error("Agent '{0}' is registered more than once")]
    DuplicateAgent(AgentName),

    #[error("Entry agent '{0}' is not registered")]
    UnknownEntryAgent(AgentName),

    #[error("Agent '{agent}' made an invalid hand-off: {source}")]
    InvalidHandOff {
        agent: AgentName,
        #[source]
        source: TransitionError,
    },

    #[error("Agent '{agent}' failed: {source}")]
    AgentFailed {
        agent: AgentName,
        #[source]
        source: AgentError,
    },

    #[error("Swarm state error: {0}")]
    State(#[from] TransitionError),
}

impl SwarmError {
    /// Agent the failure is attributed to, if any
    pub fn agent(&self) -> Option<&AgentName> {
        match self {
            SwarmError::InvalidHandOff { agent, .. } | SwarmError::AgentFailed { agent, .. } => {
                Some(agent)
            }
            SwarmError::DuplicateAgent(agent) | SwarmError::UnknownEntryAgent(agent) => Some(agent),
            SwarmError::NoAgents | SwarmError::State(_) => None,
        }
    }
}

/// A run that reached `Completed`
#[derive(Debug)]
pub struct SwarmRun {
    pub state: SwarmState,
    pub history: ExecutionHistory,
}

/// Use case for coordinating a swarm of agents
pub struct SwarmCoordinator {
    agents: Vec<Arc<dyn SwarmAgent>>,
    max_hops: usize,
}

impl SwarmCoordinator {
    /// Register agents. Names must be unique.
    ///
    /// The hop budget defaults to two hand-offs per agent.
    pub fn new(agents: Vec<Arc<dyn SwarmAgent>>) -> Result<Self, SwarmError> {
        if agents.is_empty() {
            return Err(SwarmError::NoAgents);
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name().clone()) {
                return Err(SwarmError::DuplicateAgent(agent.name().clone()));
            }
        }
        let max_hops = crate::config::swarm_params::DEFAULT_HOPS_PER_AGENT * agents.len();
        Ok(Self { agents, max_hops })
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn roster(&self) -> Vec<AgentName> {
        self.agents.iter().map(|a| a.name().clone()).collect()
    }

    fn agent(&self, name: &AgentName) -> Option<&Arc<dyn SwarmAgent>> {
        self.agents.iter().find(|a| a.name() == name)
    }

    /// Run the swarm from `entry` until an agent answers, the hop budget
    /// runs out, or something fails.
    pub async fn run(
        &self,
        entry: &AgentName,
        context: SharedContext,
        progress: &dyn SwarmProgressNotifier,
    ) -> Result<SwarmRun, SwarmError> {
        let mut state = SwarmState::new(self.roster(), context, self.max_hops);
        let mut history = ExecutionHistory::new();

        state.activate(entry).map_err(|e| match e {
            TransitionError::UnknownAgent(name) => SwarmError::UnknownEntryAgent(name),
            other => SwarmError::State(other),
        })?;
        progress.on_state_change(&state);
        info!(
            "Starting swarm at {} ({} agents, hop budget {})",
            entry,
            self.agents.len(),
            self.max_hops
        );

        while let Some(active) = state.active().cloned() {
            let Some(agent) = self.agent(&active) else {
                // The roster is built from `agents`, so this is unreachable
                // unless the state machine is broken.
                state.fail();
                return Err(SwarmError::State(TransitionError::UnknownAgent(active)));
            };

            let snapshot = state.context().clone();
            let hop = state.hop_count();
            progress.on_agent_start(&active, hop);

            let span = info_span!(
                "agent_turn",
                agent = %active,
                agent_type = %agent.domain(),
                hop
            );
            let started_at = Instant::now();
            let result = agent.act(&snapshot).instrument(span).await;
            let finished_at = Instant::now();

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(source) => {
                    warn!(agent = %active, "Agent failed: {}", source);
                    state.fail();
                    progress.on_state_change(&state);
                    return Err(SwarmError::AgentFailed {
                        agent: active,
                        source,
                    });
                }
            };

            match &outcome {
                AgentOutcome::Answer { content } => {
                    state.complete(content)?;
                    debug!(agent = %active, "Agent answered");
                    progress.on_agent_complete(&active);
                }
                AgentOutcome::HandOff { target, rationale } => {
                    match state.hand_off(target, rationale) {
                        Ok(HandOffResult::Continued) => {
                            debug!(from = %active, to = %target, "Hand-off");
                            progress.on_handoff(&active, target, rationale);
                        }
                        Ok(HandOffResult::BudgetExhausted) => {
                            warn!(
                                agent = %active,
                                target = %target,
                                "Hop budget of {} exhausted, completing with gathered findings",
                                self.max_hops
                            );
                        }
                        Err(source) => {
                            warn!(agent = %active, "Invalid hand-off: {}", source);
                            state.fail();
                            progress.on_state_change(&state);
                            return Err(SwarmError::InvalidHandOff {
                                agent: active,
                                source,
                            });
                        }
                    }
                }
            }

            history.push(HistoryEntry::new(active, started_at, finished_at, outcome));
            progress.on_state_change(&state);
        }

        info!(
            "Swarm completed after {} activations ({} hops)",
            history.len(),
            state.hop_count()
        );
        Ok(SwarmRun { state, history })
    }
}
