//! Application-level configuration.
//!
//! - [`SwarmParams`] - hop budget, tool turn limit, repeat-visit policy, timeout

pub mod swarm_params;

pub use swarm_params::SwarmParams;
