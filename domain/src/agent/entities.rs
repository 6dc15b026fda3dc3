//! Agent descriptors and identities.

use crate::core::backend::DiagnosticBackend;
use crate::prompt::directives;
use serde::{Deserialize, Serialize};

/// Unique name of an agent within one swarm.
///
/// Names double as hand-off targets, so they are compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentName(String);

impl AgentName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable title used as a report section heading.
    ///
    /// Underscores become spaces and every word is capitalised:
    /// `diagnostic_agent` → `Diagnostic Agent`.
    pub fn title(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<T: Into<String>> From<T> for AgentName {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diagnostic domain an agent specialises in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentDomain {
    /// Cluster and workload state
    Diagnostic,
    /// Metrics, alarms and logs
    Observability,
    /// Storage and database state
    Persistence,
}

impl AgentDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentDomain::Diagnostic => "diagnostic",
            AgentDomain::Observability => "observability",
            AgentDomain::Persistence => "persistence",
        }
    }

    /// Conventional agent name for this domain
    pub fn agent_name(&self) -> AgentName {
        AgentName::new(format!("{}_agent", self.as_str()))
    }
}

impl std::fmt::Display for AgentDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of one specialist in the swarm.
///
/// The tool session an agent is bound to lives outside the domain layer;
/// the descriptor only records who the agent is and how it is instructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub name: AgentName,
    pub domain: AgentDomain,
    pub directive: String,
}

impl AgentDescriptor {
    pub fn new(name: impl Into<AgentName>, domain: AgentDomain, directive: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain,
            directive: directive.into(),
        }
    }

    /// Cluster specialist, instructed for the selected backend's toolset
    pub fn diagnostic(backend: DiagnosticBackend) -> Self {
        Self::new(
            AgentDomain::Diagnostic.agent_name(),
            AgentDomain::Diagnostic,
            directives::diagnostic(backend),
        )
    }

    pub fn observability() -> Self {
        Self::new(
            AgentDomain::Observability.agent_name(),
            AgentDomain::Observability,
            directives::OBSERVABILITY,
        )
    }

    pub fn persistence() -> Self {
        Self::new(
            AgentDomain::Persistence.agent_name(),
            AgentDomain::Persistence,
            directives::PERSISTENCE,
        )
    }

    /// The standard three-agent roster, entry agent first
    pub fn roster(backend: DiagnosticBackend) -> Vec<Self> {
        vec![
            Self::diagnostic(backend),
            Self::observability(),
            Self::persistence(),
        ]
    }
}
