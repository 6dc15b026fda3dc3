//! Swarm parameters for the coordination loop
//!
//! [`SwarmParams`] groups the static parameters that bound an
//! investigation: how many hand-offs are allowed, how many tool turns a
//! single agent may take, how repeated visits are reported, and the overall
//! deadline.

use sherlock_domain::RepeatVisitPolicy;
use std::time::Duration;

/// Hand-offs allowed per registered agent when no explicit budget is set
pub const DEFAULT_HOPS_PER_AGENT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct SwarmParams {
    /// Maximum number of hand-offs. `None` means
    /// [`DEFAULT_HOPS_PER_AGENT`] times the number of agents.
    pub max_handoffs: Option<usize>,
    /// Maximum tool use turns in a single agent activation.
    pub max_tool_turns: usize,
    /// How an agent's repeated contributions end up in the report.
    pub repeat_visits: RepeatVisitPolicy,
    /// Deadline for the whole investigation, including session start-up.
    pub timeout: Option<Duration>,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            max_handoffs: None,
            max_tool_turns: 20,
            repeat_visits: RepeatVisitPolicy::Overwrite,
            timeout: None,
        }
    }
}

impl SwarmParams {
    /// Effective hop budget for a swarm of `agent_count` agents
    pub fn hop_budget(&self, agent_count: usize) -> usize {
        self.max_handoffs
            .unwrap_or(DEFAULT_HOPS_PER_AGENT * agent_count)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_handoffs(mut self, max: usize) -> Self {
        self.max_handoffs = Some(max);
        self
    }

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_repeat_visits(mut self, policy: RepeatVisitPolicy) -> Self {
        self.repeat_visits = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = SwarmParams::default();
        assert_eq!(params.hop_budget(3), 6);
        assert_eq!(params.max_tool_turns, 20);
        assert_eq!(params.repeat_visits, RepeatVisitPolicy::Overwrite);
        assert!(params.timeout.is_none());
    }

    #[test]
    fn test_builder() {
        let params = SwarmParams::default()
            .with_max_handoffs(1)
            .with_max_tool_turns(5)
            .with_repeat_visits(RepeatVisitPolicy::Concatenate)
            .with_timeout(Some(Duration::from_secs(300)));

        assert_eq!(params.hop_budget(3), 1);
        assert_eq!(params.max_tool_turns, 5);
        assert_eq!(params.repeat_visits, RepeatVisitPolicy::Concatenate);
        assert_eq!(params.timeout, Some(Duration::from_secs(300)));
    }
}
