//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::DiagnosticBackend`] - which diagnostic tool provider leads the swarm
//! - [`query::InvestigationQuery`] - a validated incident description
//! - [`error::DomainError`] - domain-level errors

pub mod backend;
pub mod error;
pub mod query;
