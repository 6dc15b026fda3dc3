//! Configuration file loading for sherlock
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `SHERLOCK_<SECTION>__<KEY>` (plus `AWS_REGION` for `[aws] region`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./sherlock.toml` or `./.sherlock.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/sherlock/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAwsConfig, FileBackendConfig, FileBackendsConfig, FileConfig,
    FileLoggingConfig, FileModelConfig, FileSwarmConfig, FileTraceConfig,
};
pub use loader::ConfigLoader;
