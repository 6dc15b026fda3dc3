//! Reasoning backends implementing the `LlmGateway` port

#[cfg(feature = "bedrock")]
pub mod bedrock;
