//! Trace and log file configuration (`[trace]` and `[logging]` sections)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTraceConfig {
    /// Record one investigation span per run
    pub enabled: bool,
    /// JSONL file receiving the span records
    pub path: Option<PathBuf>,
}

impl FileTraceConfig {
    /// Configured path, or `<data dir>/sherlock/traces.jsonl`
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("sherlock").join("traces.jsonl"))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write logs to this file in addition to stderr
    pub file: Option<PathBuf>,
}
