//! Infrastructure layer for sherlock
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: MCP tool sessions, the Bedrock reasoning
//! gateway, the JSONL trace sink and configuration file loading.

pub mod backends;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;

// Re-export commonly used types
pub use backends::McpSessionFactory;
pub use config::{
    ConfigLoader, ConfigValidationError, FileAwsConfig, FileBackendConfig, FileBackendsConfig,
    FileConfig, FileModelConfig, FileSwarmConfig, FileTraceConfig,
};
pub use logging::JsonlTraceSink;
pub use mcp::{McpError, McpServerSpec, McpStdioSession};
#[cfg(feature = "bedrock")]
pub use providers::bedrock::{BedrockConfig, BedrockLlmGateway};
