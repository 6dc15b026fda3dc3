//! Tool-server mode: the investigation exposed as an MCP tool.
//!
//! The server reads newline-delimited JSON-RPC 2.0 from stdin and answers
//! on stdout. It advertises a single tool, `sherlock`, taking the incident
//! `query` and an optional `diagnostic_agent`. Requests are handled in the
//! order they arrive.

mod tool_server;

pub use tool_server::{InvestigationService, SHERLOCK_TOOL, ToolServer};
