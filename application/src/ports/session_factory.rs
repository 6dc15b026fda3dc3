//! Tool session factory port

use sherlock_domain::{AgentDomain, DiagnosticBackend, ToolSession};
use std::sync::Arc;
use thiserror::Error;

/// A session could not be described from the current configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No usable tool session for {domain}: {reason}")]
pub struct SessionFactoryError {
    pub domain: AgentDomain,
    pub reason: String,
}

/// Creates (unopened) tool sessions for each agent domain.
///
/// Creating a session must not start anything; all I/O happens in
/// [`ToolSession::open`].
pub trait ToolSessionFactory: Send + Sync {
    fn create(
        &self,
        domain: AgentDomain,
        backend: DiagnosticBackend,
    ) -> Result<Arc<dyn ToolSession>, SessionFactoryError>;
}
