//! Agent instructions.
//!
//! [`directives`] holds the fixed directive text of each specialist and the
//! small pieces of prompt that describe the swarm to an agent.

pub mod directives;
