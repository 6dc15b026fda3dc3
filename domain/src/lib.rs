//! Domain layer for sherlock
//!
//! This crate contains the core types of an incident investigation. It has
//! no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Swarm
//!
//! An investigation is run by a small swarm of specialist agents. Exactly one
//! agent holds control at a time; it either answers, which ends the run, or
//! hands off to a peer together with a rationale. A hop budget bounds the
//! number of hand-offs.
//!
//! ## Tool Sessions
//!
//! Every agent works through one tool session (cluster diagnostics, metrics
//! and logs, or database state). Sessions are acquired all-or-nothing before
//! the swarm starts and released in reverse order afterwards.

pub mod agent;
pub mod core;
pub mod prompt;
pub mod session;
pub mod swarm;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    entities::{AgentDescriptor, AgentDomain, AgentName},
    outcome::AgentOutcome,
};
pub use core::{backend::DiagnosticBackend, error::DomainError, query::InvestigationQuery};
pub use session::response::{ContentBlock, LlmResponse, StopReason};
pub use swarm::{
    context::{Contribution, SharedContext},
    history::{ExecutionHistory, HistoryEntry},
    report::{REPORT_HEADER, format_report},
    result::{AgentSection, FormattingError, InvestigationResult, RepeatVisitPolicy, aggregate},
    state::{HandOffResult, SwarmPhase, SwarmState, SwarmStatus, TransitionError},
};
pub use tool::{
    entities::{OperationDescriptor, ToolCall, ToolCatalog},
    session::{SessionError, ToolSession},
    value_objects::{ToolError, ToolResult},
};
