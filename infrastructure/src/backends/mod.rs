//! Tool providers of the investigation swarm, one MCP server per domain.

mod factory;

pub use factory::{McpSessionFactory, backend_id, display_name};
