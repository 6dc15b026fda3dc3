//! Presentation layer for sherlock
//!
//! This crate contains the CLI definition, output formatters,
//! progress reporters, and the stdio tool server.

pub mod cli;
pub mod output;
pub mod progress;
pub mod server;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::{ConsoleFormatter, FAILURE_HINT};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use server::{InvestigationService, SHERLOCK_TOOL, ToolServer};
