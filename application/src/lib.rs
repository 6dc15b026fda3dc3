//! Application layer for sherlock
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SwarmParams;
pub use ports::{
    llm_gateway::{GatewayError, LlmGateway, LlmSession, ToolResultMessage},
    progress::{NoProgress, SwarmProgressNotifier},
    session_factory::{SessionFactoryError, ToolSessionFactory},
    swarm_agent::{AgentError, AgentFactory, SwarmAgent},
    trace_sink::{NoTraceSink, TraceSink, TraceSpan},
};
pub use use_cases::coordinate_swarm::{SwarmCoordinator, SwarmError, SwarmRun};
pub use use_cases::investigate::{
    INVESTIGATION_SPAN, InvestigateUseCase, InvestigationError, InvestigationInput,
    InvestigationOutput, augment_query,
};
pub use use_cases::llm_agent::{LlmAgentFactory, LlmSwarmAgent};
pub use use_cases::session_scope::{AcquiredSession, AcquisitionError, SessionScope};
