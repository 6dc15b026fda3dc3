//! Swarm configuration from TOML (`[swarm]` section)

use serde::{Deserialize, Serialize};
use sherlock_application::SwarmParams;
use sherlock_domain::RepeatVisitPolicy;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSwarmConfig {
    /// Hand-off budget (default: two per registered agent)
    pub max_handoffs: Option<usize>,
    /// Tool turns one agent may take per activation
    pub max_tool_turns: usize,
    /// "overwrite" or "concatenate"
    pub repeat_visits: RepeatVisitPolicy,
    /// Deadline for the whole investigation, session start-up included
    pub timeout_seconds: Option<u64>,
}

impl Default for FileSwarmConfig {
    fn default() -> Self {
        let params = SwarmParams::default();
        Self {
            max_handoffs: params.max_handoffs,
            max_tool_turns: params.max_tool_turns,
            repeat_visits: params.repeat_visits,
            timeout_seconds: None,
        }
    }
}

impl FileSwarmConfig {
    pub fn to_params(&self) -> SwarmParams {
        let params = SwarmParams::default()
            .with_max_tool_turns(self.max_tool_turns)
            .with_repeat_visits(self.repeat_visits)
            .with_timeout(self.timeout_seconds.map(Duration::from_secs));
        match self.max_handoffs {
            Some(max) => params.with_max_handoffs(max),
            None => params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_params() {
        assert_eq!(FileSwarmConfig::default().to_params(), SwarmParams::default());
    }

    #[test]
    fn test_to_params() {
        let config: FileSwarmConfig = toml::from_str(
            r#"
max_handoffs = 4
repeat_visits = "concatenate"
timeout_seconds = 600
"#,
        )
        .unwrap();

        let params = config.to_params();
        assert_eq!(params.hop_budget(3), 4);
        assert_eq!(params.max_tool_turns, 20);
        assert_eq!(params.repeat_visits, RepeatVisitPolicy::Concatenate);
        assert_eq!(params.timeout, Some(Duration::from_secs(600)));
    }
}
