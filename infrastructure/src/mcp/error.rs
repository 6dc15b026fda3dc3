//! Error types for the MCP adapter

use sherlock_domain::SessionError;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when communicating with an MCP server
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn MCP server: {0}")]
    SpawnError(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Framing error: {0}")]
    Framing(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Request '{0}' timed out")]
    Timeout(String),
}

impl From<tokio_util::codec::LinesCodecError> for McpError {
    fn from(e: tokio_util::codec::LinesCodecError) -> Self {
        match e {
            tokio_util::codec::LinesCodecError::Io(io) => McpError::Io(io),
            other => McpError::Framing(other.to_string()),
        }
    }
}

impl From<McpError> for SessionError {
    fn from(e: McpError) -> Self {
        match e {
            McpError::CommandNotFound(cmd) => SessionError::NotAvailable(cmd),
            McpError::SpawnError(io) => SessionError::Spawn(io.to_string()),
            McpError::TransportClosed | McpError::Io(_) | McpError::Timeout(_) => {
                SessionError::Invocation(e.to_string())
            }
            other => SessionError::Protocol(other.to_string()),
        }
    }
}
