//! Investigation query value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The incident description an investigation starts from (Value Object)
///
/// Immutable once created. Agents never see this text directly; the
/// investigation prefixes it with the current time first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationQuery {
    content: String,
}

impl InvestigationQuery {
    /// Create a query, rejecting empty or whitespace-only text
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }
        Ok(Self { content })
    }

    /// Get the query content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render the time-augmented form agents receive.
    ///
    /// `timestamp` is already formatted by the caller so the domain stays
    /// free of clock access.
    pub fn augmented(&self, timestamp: &str) -> String {
        format!(
            "Current time: {} UTC\n\nUser query: {}",
            timestamp, self.content
        )
    }
}

impl std::fmt::Display for InvestigationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = InvestigationQuery::try_new("checkout pods crash looping").unwrap();
        assert_eq!(q.content(), "checkout pods crash looping");
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(InvestigationQuery::try_new("").is_err());
        assert!(InvestigationQuery::try_new("   \n").is_err());
    }

    #[test]
    fn test_augmented_form() {
        let q = InvestigationQuery::try_new("latency spike").unwrap();
        assert_eq!(
            q.augmented("Monday, 2025-03-03 14:05:00"),
            "Current time: Monday, 2025-03-03 14:05:00 UTC\n\nUser query: latency spike"
        );
    }
}
