//! Swarm agent port
//!
//! The coordinator only knows agents through [`SwarmAgent::act`]. How an
//! agent reaches its decision is up to the implementation.

use super::llm_gateway::GatewayError;
use async_trait::async_trait;
use sherlock_domain::{
    AgentDescriptor, AgentDomain, AgentName, AgentOutcome, SessionError, SharedContext,
    ToolCatalog, ToolSession,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by an agent during its turn
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Reasoning backend error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Tool session error: {0}")]
    Session(#[from] SessionError),

    #[error("Exceeded {0} tool turns without reaching a decision")]
    TurnLimit(usize),

    #[error("Malformed hand-off request: {0}")]
    MalformedHandOff(String),

    #[error("{0}")]
    Other(String),
}

/// A specialist that can take control of the swarm
#[async_trait]
pub trait SwarmAgent: Send + Sync {
    fn name(&self) -> &AgentName;

    fn domain(&self) -> AgentDomain;

    /// Run one turn over a read-only snapshot of the shared context
    async fn act(&self, context: &SharedContext) -> Result<AgentOutcome, AgentError>;
}

/// Builds agents bound to freshly opened tool sessions
pub trait AgentFactory: Send + Sync {
    fn build(
        &self,
        descriptor: AgentDescriptor,
        session: Arc<dyn ToolSession>,
        catalog: ToolCatalog,
        peers: Vec<AgentName>,
    ) -> Arc<dyn SwarmAgent>;
}
