//! Agent subdomain - who takes part in an investigation and what a turn yields.
//!
//! - [`entities::AgentDescriptor`] - name, domain and directive of one specialist
//! - [`outcome::AgentOutcome`] - the result of one agent activation

pub mod entities;
pub mod outcome;
