//! Progress notification port
//!
//! Defines the interface for reporting progress during an investigation.

use sherlock_domain::{AgentName, SwarmState};

/// Callback for progress updates during an investigation
///
/// Implementations live in the presentation layer. Every callback has a
/// no-op default so adapters only implement what they display.
pub trait SwarmProgressNotifier: Send + Sync {
    /// A tool session finished opening
    fn on_session_opened(&self, _session: &str, _operations: usize) {}

    /// All sessions have been closed
    fn on_sessions_released(&self, _count: usize) {}

    /// An agent took control
    fn on_agent_start(&self, _agent: &AgentName, _hop: usize) {}

    /// Control moved between agents
    fn on_handoff(&self, _from: &AgentName, _to: &AgentName, _rationale: &str) {}

    /// An agent produced the final answer
    fn on_agent_complete(&self, _agent: &AgentName) {}

    /// Called after every state transition, with the state it produced
    fn on_state_change(&self, _state: &SwarmState) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SwarmProgressNotifier for NoProgress {}
