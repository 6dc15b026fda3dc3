//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid diagnostic agent: {0}. Must be 'k8sgpt' or 'eks-mcp'")]
    UnknownBackend(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_backend_display() {
        let error = DomainError::UnknownBackend("datadog".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid diagnostic agent: datadog. Must be 'k8sgpt' or 'eks-mcp'"
        );
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::InvalidQuery("empty".to_string()).is_cancelled());
    }
}
