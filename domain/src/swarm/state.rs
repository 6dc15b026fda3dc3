//! Swarm state machine

use super::context::SharedContext;
use crate::agent::entities::AgentName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse status reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwarmStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SwarmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwarmStatus::Pending => "pending",
            SwarmStatus::Running => "running",
            SwarmStatus::Completed => "completed",
            SwarmStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SwarmStatus::Completed | SwarmStatus::Failed)
    }
}

impl std::fmt::Display for SwarmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Precise state, including which agent holds control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwarmPhase {
    Pending,
    Active(AgentName),
    Completed,
    Failed,
}

impl SwarmPhase {
    pub fn status(&self) -> SwarmStatus {
        match self {
            SwarmPhase::Pending => SwarmStatus::Pending,
            SwarmPhase::Active(_) => SwarmStatus::Running,
            SwarmPhase::Completed => SwarmStatus::Completed,
            SwarmPhase::Failed => SwarmStatus::Failed,
        }
    }
}

/// Illegal transition requested of the state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Agent '{0}' is not part of this swarm")]
    UnknownAgent(AgentName),

    #[error("Agent '{0}' cannot hand off to itself")]
    SelfHandOff(AgentName),

    #[error("Swarm must be pending to start, found {0}")]
    NotPending(SwarmStatus),

    #[error("No agent is active (swarm is {0})")]
    NotActive(SwarmStatus),
}

/// What a hand-off request resulted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOffResult {
    /// Control moved to the target
    Continued,
    /// The hop budget was spent; the swarm completed instead
    BudgetExhausted,
}

/// State of one swarm run.
///
/// At most one agent is active at any time, and only while the status is
/// `Running`. The hop budget bounds the number of hand-offs so a cycle
/// between agents always terminates.
#[derive(Debug, Clone)]
pub struct SwarmState {
    roster: Vec<AgentName>,
    phase: SwarmPhase,
    context: SharedContext,
    hop_count: usize,
    max_hops: usize,
    budget_exhausted: bool,
}

impl SwarmState {
    pub fn new(roster: Vec<AgentName>, context: SharedContext, max_hops: usize) -> Self {
        Self {
            roster,
            phase: SwarmPhase::Pending,
            context,
            hop_count: 0,
            max_hops,
            budget_exhausted: false,
        }
    }

    pub fn phase(&self) -> &SwarmPhase {
        &self.phase
    }

    pub fn status(&self) -> SwarmStatus {
        self.phase.status()
    }

    pub fn active(&self) -> Option<&AgentName> {
        match &self.phase {
            SwarmPhase::Active(name) => Some(name),
            _ => None,
        }
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }

    pub fn hop_count(&self) -> usize {
        self.hop_count
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn budget_exhausted(&self) -> bool {
        self.budget_exhausted
    }

    pub fn roster(&self) -> &[AgentName] {
        &self.roster
    }

    fn require_member(&self, name: &AgentName) -> Result<(), TransitionError> {
        if self.roster.contains(name) {
            Ok(())
        } else {
            Err(TransitionError::UnknownAgent(name.clone()))
        }
    }

    fn require_active(&self) -> Result<AgentName, TransitionError> {
        self.active()
            .cloned()
            .ok_or(TransitionError::NotActive(self.status()))
    }

    /// `Pending → Active(entry)`
    pub fn activate(&mut self, entry: &AgentName) -> Result<(), TransitionError> {
        if self.phase != SwarmPhase::Pending {
            return Err(TransitionError::NotPending(self.status()));
        }
        self.require_member(entry)?;
        self.phase = SwarmPhase::Active(entry.clone());
        Ok(())
    }

    /// Hand control from the active agent to `target`.
    ///
    /// The rationale is appended to the shared context either way. When the
    /// budget is already spent the swarm completes instead of moving on.
    pub fn hand_off(
        &mut self,
        target: &AgentName,
        rationale: &str,
    ) -> Result<HandOffResult, TransitionError> {
        let current = self.require_active()?;
        if &current == target {
            return Err(TransitionError::SelfHandOff(current));
        }
        self.require_member(target)?;

        self.context.record(current, rationale);
        if self.hop_count >= self.max_hops {
            self.budget_exhausted = true;
            self.phase = SwarmPhase::Completed;
            return Ok(HandOffResult::BudgetExhausted);
        }
        self.hop_count += 1;
        self.phase = SwarmPhase::Active(target.clone());
        Ok(HandOffResult::Continued)
    }

    /// The active agent answered: `Active → Completed`
    pub fn complete(&mut self, answer: &str) -> Result<(), TransitionError> {
        let current = self.require_active()?;
        self.context.record(current, answer);
        self.phase = SwarmPhase::Completed;
        Ok(())
    }

    /// Any non-terminal phase may fail
    pub fn fail(&mut self) {
        if !self.status().is_terminal() {
            self.phase = SwarmPhase::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<AgentName> {
        vec![
            AgentName::new("diagnostic_agent"),
            AgentName::new("observability_agent"),
            AgentName::new("persistence_agent"),
        ]
    }

    fn state(max_hops: usize) -> SwarmState {
        SwarmState::new(roster(), SharedContext::new("q"), max_hops)
    }

    #[test]
    fn test_activate_from_pending_only() {
        let mut s = state(6);
        assert_eq!(s.status(), SwarmStatus::Pending);
        assert!(s.active().is_none());

        s.activate(&AgentName::new("diagnostic_agent")).unwrap();
        assert_eq!(s.active().unwrap().as_str(), "diagnostic_agent");
        assert_eq!(
            s.activate(&AgentName::new("diagnostic_agent")),
            Err(TransitionError::NotPending(SwarmStatus::Running))
        );
    }

    #[test]
    fn test_activate_unknown_entry() {
        let mut s = state(6);
        assert!(matches!(
            s.activate(&AgentName::new("ghost")),
            Err(TransitionError::UnknownAgent(_))
        ));
        assert_eq!(s.status(), SwarmStatus::Pending);
    }

    #[test]
    fn test_hand_off_moves_control_and_records_rationale() {
        let mut s = state(6);
        s.activate(&AgentName::new("diagnostic_agent")).unwrap();
        let result = s
            .hand_off(&AgentName::new("observability_agent"), "pods healthy, check metrics")
            .unwrap();
        assert_eq!(result, HandOffResult::Continued);
        assert_eq!(s.active().unwrap().as_str(), "observability_agent");
        assert_eq!(s.hop_count(), 1);
        let latest = s.context().latest().unwrap();
        assert_eq!(latest.agent.as_str(), "diagnostic_agent");
        assert_eq!(latest.content, "pods healthy, check metrics");
    }

    #[test]
    fn test_self_and_unknown_hand_off_rejected() {
        let mut s = state(6);
        s.activate(&AgentName::new("diagnostic_agent")).unwrap();
        assert_eq!(
            s.hand_off(&AgentName::new("diagnostic_agent"), "again"),
            Err(TransitionError::SelfHandOff(AgentName::new("diagnostic_agent")))
        );
        assert_eq!(
            s.hand_off(&AgentName::new("nonexistent_agent"), "?"),
            Err(TransitionError::UnknownAgent(AgentName::new(
                "nonexistent_agent"
            )))
        );
        // Rejected requests leave the state untouched
        assert_eq!(s.active().unwrap().as_str(), "diagnostic_agent");
        assert!(s.context().contributions().is_empty());
    }

    #[test]
    fn test_budget_exhaustion_completes() {
        let mut s = state(1);
        s.activate(&AgentName::new("diagnostic_agent")).unwrap();
        assert_eq!(
            s.hand_off(&AgentName::new("observability_agent"), "a").unwrap(),
            HandOffResult::Continued
        );
        assert_eq!(
            s.hand_off(&AgentName::new("diagnostic_agent"), "b").unwrap(),
            HandOffResult::BudgetExhausted
        );
        assert_eq!(s.status(), SwarmStatus::Completed);
        assert!(s.budget_exhausted());
        assert!(s.active().is_none());
        assert_eq!(s.context().contributions().len(), 2);
    }

    #[test]
    fn test_complete_and_fail() {
        let mut s = state(6);
        assert!(s.complete("x").is_err());
        s.activate(&AgentName::new("diagnostic_agent")).unwrap();
        s.complete("no pod issues found").unwrap();
        assert_eq!(s.status(), SwarmStatus::Completed);

        // Terminal states are not overwritten
        s.fail();
        assert_eq!(s.status(), SwarmStatus::Completed);

        let mut t = state(6);
        t.activate(&AgentName::new("diagnostic_agent")).unwrap();
        t.fail();
        assert_eq!(t.status(), SwarmStatus::Failed);
        assert!(t.active().is_none());
    }
}
