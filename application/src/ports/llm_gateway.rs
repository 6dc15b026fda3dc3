//! LLM Gateway port
//!
//! Defines the interface for talking to the reasoning backend that drives
//! each agent.

use async_trait::async_trait;
use sherlock_domain::{LlmResponse, OperationDescriptor};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result of one tool call, sent back to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResultMessage {
    /// ID of the tool-use block this answers
    pub tool_use_id: String,
    pub tool_name: String,
    pub output: String,
    pub is_error: bool,
}

/// Gateway for LLM communication
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Start a conversation with the given system prompt
    async fn create_session(&self, system_prompt: &str) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active conversation with the model.
///
/// The session keeps the message history, so callers only pass what is new.
#[async_trait]
pub trait LlmSession: Send + Sync {
    fn model(&self) -> &str;

    /// Send a user message, offering `tools` for native tool use
    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[OperationDescriptor],
    ) -> Result<LlmResponse, GatewayError>;

    /// Answer the tool-use blocks of the previous response
    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError>;
}
