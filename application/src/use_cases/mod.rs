//! Use cases (application business logic)
//!
//! - [`coordinate_swarm`] - the hand-off loop over a fixed set of agents
//! - [`session_scope`] - all-or-nothing tool session acquisition and release
//! - [`llm_agent`] - agents driven by a reasoning backend with native tool use
//! - [`investigate`] - the full investigation envelope

pub mod coordinate_swarm;
pub mod investigate;
pub mod llm_agent;
pub mod session_scope;

#[cfg(test)]
pub(crate) mod test_support;
