//! MCP (Model Context Protocol) tool sessions over stdio.
//!
//! Every domain tool provider is an MCP server started as a child process.
//! Messages are newline-delimited JSON-RPC 2.0 on the child's stdin/stdout;
//! the child's stderr is forwarded to the log.
//!
//! ```text
//! open():   spawn ─► initialize ─► notifications/initialized ─► tools/list*
//! invoke(): tools/call
//! close():  close stdin ─► wait (grace period) ─► kill
//! ```

pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use error::McpError;
pub use session::{McpServerSpec, McpStdioSession};
