//! Result aggregation

use super::history::ExecutionHistory;
use super::state::SwarmStatus;
use crate::agent::entities::AgentName;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;

/// History could not be turned into a result
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormattingError {
    #[error("Execution history is empty")]
    EmptyHistory,

    #[error("Execution history is out of chronological order")]
    OutOfOrder,
}

/// What to do when an agent contributes more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatVisitPolicy {
    /// Keep only the most recent contribution
    #[default]
    Overwrite,
    /// Keep every contribution, oldest first
    Concatenate,
}

impl RepeatVisitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatVisitPolicy::Overwrite => "overwrite",
            RepeatVisitPolicy::Concatenate => "concatenate",
        }
    }
}

impl std::str::FromStr for RepeatVisitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(RepeatVisitPolicy::Overwrite),
            "concatenate" | "merge" => Ok(RepeatVisitPolicy::Concatenate),
            other => Err(format!(
                "unknown repeat visit policy '{}' (expected overwrite or concatenate)",
                other
            )),
        }
    }
}

impl Serialize for RepeatVisitPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RepeatVisitPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Separator between visits under [`RepeatVisitPolicy::Concatenate`]
pub const VISIT_SEPARATOR: &str = "\n\n---\n\n";

/// Findings of one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSection {
    pub agent: AgentName,
    pub content: String,
}

impl AgentSection {
    pub fn title(&self) -> String {
        self.agent.title()
    }
}

/// Final, immutable outcome of a completed investigation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestigationResult {
    pub status: SwarmStatus,
    /// One section per contributing agent, in first-visit order
    pub sections: Vec<AgentSection>,
    pub agents_visited: Vec<AgentName>,
    #[serde(rename = "execution_time_secs", serialize_with = "duration_secs")]
    pub execution_time: Duration,
    pub hop_count: usize,
    pub budget_exhausted: bool,
}

fn duration_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64())
}

impl InvestigationResult {
    pub fn section(&self, agent: &str) -> Option<&AgentSection> {
        self.sections.iter().find(|s| s.agent.as_str() == agent)
    }
}

/// Reduce a completed run's history into per-agent findings.
///
/// Sections follow first-visit order; repeated visits are folded according
/// to `policy`. An agent whose visits so far have no content has no section,
/// but under [`RepeatVisitPolicy::Overwrite`] a later blank visit still
/// replaces earlier content.
pub fn aggregate(
    history: &ExecutionHistory,
    hop_count: usize,
    budget_exhausted: bool,
    policy: RepeatVisitPolicy,
) -> Result<InvestigationResult, FormattingError> {
    if history.is_empty() {
        return Err(FormattingError::EmptyHistory);
    }
    if !history.is_well_ordered() {
        return Err(FormattingError::OutOfOrder);
    }

    let mut sections: Vec<AgentSection> = Vec::new();
    for entry in history.entries() {
        let content = entry.content();
        let blank = content.trim().is_empty();
        match sections.iter_mut().find(|s| s.agent == entry.agent) {
            Some(section) => match policy {
                RepeatVisitPolicy::Overwrite => section.content = content.to_string(),
                RepeatVisitPolicy::Concatenate if blank => {}
                RepeatVisitPolicy::Concatenate => {
                    section.content.push_str(VISIT_SEPARATOR);
                    section.content.push_str(content);
                }
            },
            None if blank => {}
            None => sections.push(AgentSection {
                agent: entry.agent.clone(),
                content: content.to_string(),
            }),
        }
    }

    Ok(InvestigationResult {
        status: SwarmStatus::Completed,
        sections,
        agents_visited: history.agents_visited(),
        execution_time: history.total_time(),
        hop_count,
        budget_exhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::outcome::AgentOutcome;
    use crate::swarm::history::HistoryEntry;
    use std::time::Instant;

    fn history(steps: &[(&str, AgentOutcome)]) -> ExecutionHistory {
        let mut t = Instant::now();
        let mut history = ExecutionHistory::new();
        for (agent, outcome) in steps {
            let end = t + Duration::from_millis(10);
            history.push(HistoryEntry::new(
                AgentName::new(*agent),
                t,
                end,
                outcome.clone(),
            ));
            t = end;
        }
        history
    }

    #[test]
    fn test_empty_history_is_formatting_error() {
        let result = aggregate(&ExecutionHistory::new(), 0, false, RepeatVisitPolicy::Overwrite);
        assert_eq!(result, Err(FormattingError::EmptyHistory));
    }

    #[test]
    fn test_sections_in_first_visit_order() {
        let h = history(&[
            (
                "diagnostic_agent",
                AgentOutcome::hand_off("observability_agent", "pods healthy, check metrics"),
            ),
            ("observability_agent", AgentOutcome::answer("CPU at 95%, alarm firing")),
        ]);
        let result = aggregate(&h, 1, false, RepeatVisitPolicy::Overwrite).unwrap();
        let names: Vec<&str> = result.sections.iter().map(|s| s.agent.as_str()).collect();
        assert_eq!(names, vec!["diagnostic_agent", "observability_agent"]);
        assert_eq!(
            result.section("observability_agent").unwrap().content,
            "CPU at 95%, alarm firing"
        );
        assert_eq!(result.execution_time, Duration::from_millis(20));
        assert_eq!(result.status, SwarmStatus::Completed);
    }

    #[test]
    fn test_repeat_visit_overwrite_keeps_position() {
        let h = history(&[
            ("diagnostic_agent", AgentOutcome::hand_off("observability_agent", "first")),
            ("observability_agent", AgentOutcome::hand_off("diagnostic_agent", "metrics ok")),
            ("diagnostic_agent", AgentOutcome::answer("second")),
        ]);
        let result = aggregate(&h, 2, false, RepeatVisitPolicy::Overwrite).unwrap();
        assert_eq!(result.sections[0].agent.as_str(), "diagnostic_agent");
        assert_eq!(result.sections[0].content, "second");
        assert_eq!(result.agents_visited.len(), 3);
    }

    #[test]
    fn test_repeat_visit_concatenate() {
        let h = history(&[
            ("diagnostic_agent", AgentOutcome::hand_off("observability_agent", "first")),
            ("observability_agent", AgentOutcome::hand_off("diagnostic_agent", "metrics ok")),
            ("diagnostic_agent", AgentOutcome::answer("second")),
        ]);
        let result = aggregate(&h, 2, false, RepeatVisitPolicy::Concatenate).unwrap();
        assert_eq!(
            result.sections[0].content,
            format!("first{}second", VISIT_SEPARATOR)
        );
    }

    #[test]
    fn test_blank_content_contributes_no_section() {
        let h = history(&[
            ("diagnostic_agent", AgentOutcome::hand_off("persistence_agent", "  ")),
            ("persistence_agent", AgentOutcome::answer("table throttled at 1 WCU")),
        ]);
        let result = aggregate(&h, 1, false, RepeatVisitPolicy::Overwrite).unwrap();
        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.agents_visited.len(), 2);
    }

    #[test]
    fn test_blank_latest_visit_overwrites_earlier_content() {
        let h = history(&[
            (
                "diagnostic_agent",
                AgentOutcome::hand_off("observability_agent", "pods crashlooping"),
            ),
            ("observability_agent", AgentOutcome::hand_off("diagnostic_agent", "metrics ok")),
            ("diagnostic_agent", AgentOutcome::answer("")),
        ]);
        let result = aggregate(&h, 2, false, RepeatVisitPolicy::Overwrite).unwrap();
        assert_eq!(result.sections.len(), 2);
        assert_eq!(
            result.section("diagnostic_agent").map(|s| s.content.as_str()),
            Some("")
        );

        let result = aggregate(&h, 2, false, RepeatVisitPolicy::Concatenate).unwrap();
        assert_eq!(
            result.section("diagnostic_agent").map(|s| s.content.as_str()),
            Some("pods crashlooping")
        );
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Concatenate".parse::<RepeatVisitPolicy>().unwrap(),
            RepeatVisitPolicy::Concatenate
        );
        assert!("append".parse::<RepeatVisitPolicy>().is_err());
    }
}
