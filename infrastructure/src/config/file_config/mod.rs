//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backends;
mod observability;
mod providers;
mod swarm;

pub use backends::{FileBackendConfig, FileBackendsConfig};
pub use observability::{FileLoggingConfig, FileTraceConfig};
pub use providers::{FileAwsConfig, FileModelConfig};
pub use swarm::FileSwarmConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("backends.{0}: either command or image must be set")]
    MissingLauncher(String),

    #[error("backends.{0}: {1} cannot be empty")]
    EmptyLauncher(String, &'static str),

    #[error("model.model_id cannot be empty")]
    EmptyModelId,

    #[error("aws.region cannot be empty")]
    EmptyRegion,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Coordination limits
    pub swarm: FileSwarmConfig,
    /// AWS region and credentials profile
    pub aws: FileAwsConfig,
    /// Reasoning backend model
    pub model: FileModelConfig,
    /// MCP servers, one per tool provider
    pub backends: FileBackendsConfig,
    /// Investigation trace sink
    pub trace: FileTraceConfig,
    /// Log file
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.swarm.max_handoffs {
            return Err(ConfigValidationError::ZeroValue("swarm.max_handoffs"));
        }
        if self.swarm.max_tool_turns == 0 {
            return Err(ConfigValidationError::ZeroValue("swarm.max_tool_turns"));
        }
        if let Some(0) = self.swarm.timeout_seconds {
            return Err(ConfigValidationError::ZeroValue("swarm.timeout_seconds"));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigValidationError::ZeroValue("model.max_tokens"));
        }
        if self.model.model_id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelId);
        }
        if self.aws.region.trim().is_empty() {
            return Err(ConfigValidationError::EmptyRegion);
        }

        for (id, backend) in self.backends.iter() {
            match (&backend.image, &backend.command) {
                (Some(image), _) if image.trim().is_empty() => {
                    return Err(ConfigValidationError::EmptyLauncher(id.to_string(), "image"));
                }
                (None, Some(command)) if command.trim().is_empty() => {
                    return Err(ConfigValidationError::EmptyLauncher(id.to_string(), "command"));
                }
                (None, None) => return Err(ConfigValidationError::MissingLauncher(id.to_string())),
                _ => {}
            }
            if backend.startup_timeout_seconds == 0 {
                return Err(ConfigValidationError::ZeroValue("backends.*.startup_timeout_seconds"));
            }
            if backend.request_timeout_seconds == 0 {
                return Err(ConfigValidationError::ZeroValue("backends.*.request_timeout_seconds"));
            }
        }

        Ok(())
    }
}
