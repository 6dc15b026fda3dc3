//! Execution history

use crate::agent::entities::AgentName;
use crate::agent::outcome::AgentOutcome;
use std::time::{Duration, Instant};

/// One completed agent activation
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub agent: AgentName,
    pub started_at: Instant,
    pub finished_at: Instant,
    pub outcome: AgentOutcome,
}

impl HistoryEntry {
    pub fn new(
        agent: AgentName,
        started_at: Instant,
        finished_at: Instant,
        outcome: AgentOutcome,
    ) -> Self {
        Self {
            agent,
            started_at,
            finished_at,
            outcome,
        }
    }

    pub fn duration(&self) -> Duration {
        self.finished_at.saturating_duration_since(self.started_at)
    }

    pub fn content(&self) -> &str {
        self.outcome.content()
    }
}

/// Append-only, chronologically ordered record of activations.
///
/// An agent may appear more than once when control returns to it.
/// Activations that failed are never recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionHistory {
    entries: Vec<HistoryEntry>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Agents in activation order, repeats included
    pub fn agents_visited(&self) -> Vec<AgentName> {
        self.entries.iter().map(|e| e.agent.clone()).collect()
    }

    /// `last.finished_at - first.started_at`, or zero when empty
    pub fn total_time(&self) -> Duration {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.finished_at.saturating_duration_since(first.started_at),
            _ => Duration::ZERO,
        }
    }

    /// Whether every entry ends after it starts and no entry starts before
    /// its predecessor ended
    pub fn is_well_ordered(&self) -> bool {
        self.entries.iter().all(|e| e.finished_at >= e.started_at)
            && self
                .entries
                .windows(2)
                .all(|pair| pair[1].started_at >= pair[0].finished_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(agent: &str, start: Instant, millis: u64) -> HistoryEntry {
        HistoryEntry::new(
            AgentName::new(agent),
            start,
            start + Duration::from_millis(millis),
            AgentOutcome::answer("x"),
        )
    }

    #[test]
    fn test_total_time_spans_first_to_last() {
        let t0 = Instant::now();
        let mut history = ExecutionHistory::new();
        history.push(entry("diagnostic_agent", t0, 100));
        history.push(entry(
            "observability_agent",
            t0 + Duration::from_millis(150),
            50,
        ));
        assert_eq!(history.total_time(), Duration::from_millis(200));
        assert_eq!(
            history.agents_visited(),
            vec![
                AgentName::new("diagnostic_agent"),
                AgentName::new("observability_agent")
            ]
        );
        assert!(history.is_well_ordered());
    }

    #[test]
    fn test_empty_history() {
        let history = ExecutionHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.total_time(), Duration::ZERO);
    }

    #[test]
    fn test_overlapping_entries_are_not_well_ordered() {
        let t0 = Instant::now();
        let mut history = ExecutionHistory::new();
        history.push(entry("a", t0 + Duration::from_millis(100), 100));
        history.push(entry("b", t0, 10));
        assert!(!history.is_well_ordered());
    }
}
