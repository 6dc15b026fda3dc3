//! Diagnostic backend selector

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The tool provider bound to the diagnostic agent (Value Object)
///
/// The diagnostic agent is the swarm's entry point, so the selector decides
/// both which cluster tooling gets started and which agent acts first.
/// Observability and persistence providers are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagnosticBackend {
    /// Local `k8sgpt` binary speaking MCP over stdio
    #[default]
    K8sGpt,
    /// The EKS MCP server, run as a container
    EksMcp,
}

impl DiagnosticBackend {
    pub const ALL: [DiagnosticBackend; 2] = [DiagnosticBackend::K8sGpt, DiagnosticBackend::EksMcp];

    /// Selector value accepted on the command line and in tool calls
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticBackend::K8sGpt => "k8sgpt",
            DiagnosticBackend::EksMcp => "eks-mcp",
        }
    }

    /// Human-readable name used in logs and progress output
    pub fn display_name(&self) -> &'static str {
        match self {
            DiagnosticBackend::K8sGpt => "K8sGPT",
            DiagnosticBackend::EksMcp => "EKS MCP",
        }
    }

    /// Resolve an optional selector, falling back to the default backend.
    pub fn resolve(selector: Option<&str>) -> Result<Self, DomainError> {
        match selector {
            None => Ok(Self::default()),
            Some(s) => s.parse(),
        }
    }
}

impl std::fmt::Display for DiagnosticBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiagnosticBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "k8sgpt" => Ok(DiagnosticBackend::K8sGpt),
            "eks-mcp" => Ok(DiagnosticBackend::EksMcp),
            _ => Err(DomainError::UnknownBackend(s.to_string())),
        }
    }
}

impl Serialize for DiagnosticBackend {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiagnosticBackend {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_selectors() {
        assert_eq!(
            "k8sgpt".parse::<DiagnosticBackend>().unwrap(),
            DiagnosticBackend::K8sGpt
        );
        assert_eq!(
            "EKS-MCP".parse::<DiagnosticBackend>().unwrap(),
            DiagnosticBackend::EksMcp
        );
    }

    #[test]
    fn test_parse_unknown_selector() {
        let err = "prometheus".parse::<DiagnosticBackend>().unwrap_err();
        assert_eq!(err, DomainError::UnknownBackend("prometheus".to_string()));
    }

    #[test]
    fn test_resolve_defaults_to_k8sgpt() {
        assert_eq!(
            DiagnosticBackend::resolve(None).unwrap(),
            DiagnosticBackend::K8sGpt
        );
        assert!(DiagnosticBackend::resolve(Some("")).is_err());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(DiagnosticBackend::K8sGpt.display_name(), "K8sGPT");
        assert_eq!(DiagnosticBackend::EksMcp.display_name(), "EKS MCP");
    }

    #[test]
    fn test_serde_uses_selector_value() {
        let json = serde_json::to_string(&DiagnosticBackend::EksMcp).unwrap();
        assert_eq!(json, "\"eks-mcp\"");
        let back: DiagnosticBackend = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DiagnosticBackend::EksMcp);
        assert!(serde_json::from_str::<DiagnosticBackend>("\"bogus\"").is_err());
    }
}
