//! Shared context passed along the swarm

use crate::agent::entities::AgentName;
use serde::{Deserialize, Serialize};

/// One agent's contribution to the shared context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub agent: AgentName,
    pub content: String,
}

/// Query plus everything agents have reported so far.
///
/// Only the coordinator writes to it. Agents receive a read-only view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedContext {
    query: String,
    contributions: Vec<Contribution>,
}

impl SharedContext {
    /// Seed the context with the (time-augmented) query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            contributions: Vec::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn latest(&self) -> Option<&Contribution> {
        self.contributions.last()
    }

    pub(crate) fn record(&mut self, agent: AgentName, content: impl Into<String>) {
        self.contributions.push(Contribution {
            agent,
            content: content.into(),
        });
    }

    /// Render as the message an agent receives at the start of its turn
    pub fn render(&self) -> String {
        let mut out = self.query.clone();
        if self.contributions.is_empty() {
            return out;
        }
        out.push_str("\n\n## Findings from other agents\n");
        for c in &self.contributions {
            out.push_str(&format!("\n### {}\n{}\n", c.agent, c.content));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_query_only() {
        let ctx = SharedContext::new("User query: api 500s");
        assert_eq!(ctx.render(), "User query: api 500s");
        assert!(ctx.latest().is_none());
    }

    #[test]
    fn test_render_with_contributions() {
        let mut ctx = SharedContext::new("q");
        ctx.record(AgentName::new("diagnostic_agent"), "pods healthy, check metrics");
        let rendered = ctx.render();
        assert!(rendered.starts_with("q\n\n## Findings from other agents\n"));
        assert!(rendered.contains("### diagnostic_agent\npods healthy, check metrics\n"));
        assert_eq!(ctx.latest().unwrap().agent.as_str(), "diagnostic_agent");
    }
}
