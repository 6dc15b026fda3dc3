//! Tool session contract
//!
//! A [`ToolSession`] is a scoped connection to one external tool provider,
//! typically a child process speaking MCP. Sessions are owned by a single
//! investigation and bound to a single agent.
//!
//! # Lifecycle
//!
//! | State | `list_operations` | `invoke` | `close` |
//! |-------|-------------------|----------|---------|
//! | not opened | `NotOpen` | `NotOpen` | no-op |
//! | open | catalog | result | releases |
//! | closed | `Closed` | `Closed` | no-op |
//!
//! `open` must finish within [`ToolSession::startup_timeout`]; the caller
//! enforces the deadline and treats expiry as a connection failure.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::entities::{ToolCatalog, ToolCall};
use super::value_objects::ToolResult;

/// Error type for tool session operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The provider binary or image is not usable on this host
    #[error("Tool provider not available: {0}")]
    NotAvailable(String),

    /// The provider process could not be started
    #[error("Failed to start tool provider: {0}")]
    Spawn(String),

    /// The provider did not become ready in time
    #[error("Tool provider did not start within {0:?}")]
    StartupTimeout(Duration),

    /// The provider answered with something we could not understand
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation attempted before `open`
    #[error("Session is not open")]
    NotOpen,

    /// Operation attempted after `close`
    #[error("Session is closed")]
    Closed,

    /// The provider advertised no operations
    #[error("Tool provider advertised no operations")]
    EmptyCatalog,

    /// The call could not be delivered or its reply was lost
    #[error("Invocation failed: {0}")]
    Invocation(String),
}

/// Scoped connection to one external tool provider.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Stable identifier, e.g. "k8sgpt" or "cloudwatch"
    fn id(&self) -> &str;

    /// Display name for user-facing output
    fn display_name(&self) -> &str;

    /// Upper bound on how long `open` may take
    fn startup_timeout(&self) -> Duration;

    /// Start the provider and fetch its catalog.
    ///
    /// A session whose catalog cannot be populated is not usable; in that
    /// case `open` fails and the session holds no resources.
    async fn open(&self) -> Result<ToolCatalog, SessionError>;

    /// Catalog fetched by `open`. Only valid while the session is open.
    fn list_operations(&self) -> Result<ToolCatalog, SessionError>;

    /// Invoke one operation.
    ///
    /// A tool-level failure is reported inside the [`ToolResult`]; `Err` means
    /// the session itself is broken.
    async fn invoke(&self, call: &ToolCall) -> Result<ToolResult, SessionError>;

    /// Release the provider. Idempotent.
    async fn close(&self) -> Result<(), SessionError>;

    fn is_open(&self) -> bool;
}
