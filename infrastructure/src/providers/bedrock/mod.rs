//! AWS Bedrock Converse API provider
//!
//! Provides access to Claude models via AWS IAM authentication
//! through the Bedrock Converse API.

mod gateway;
mod session;
mod types;

pub use gateway::{BedrockConfig, BedrockLlmGateway};
pub use session::BedrockSession;
