//! Tool provider configuration from TOML (`[backends.<id>]` sections)
//!
//! Each backend is an MCP server started either as a local command or as a
//! docker image. When both are set, the image wins.
//!
//! ```toml
//! [backends.k8sgpt]
//! command = "/opt/bin/k8sgpt"
//! args = ["serve", "--mcp"]
//!
//! [backends.cloudwatch]
//! image = "awslabs/cloudwatch-mcp-server:1.0"
//! startup_timeout_seconds = 180
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Executable speaking MCP on stdio
    pub command: Option<String>,
    /// Docker image speaking MCP on stdio
    pub image: Option<String>,
    /// Arguments for the command, or for the image entry point
    pub args: Vec<String>,
    /// Extra environment for the server
    pub env: BTreeMap<String, String>,
    pub startup_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            command: None,
            image: None,
            args: Vec::new(),
            env: BTreeMap::new(),
            startup_timeout_seconds: 30,
            request_timeout_seconds: 120,
        }
    }
}

impl FileBackendConfig {
    fn local(command: &str, args: &[&str], startup_timeout_seconds: u64) -> Self {
        Self {
            command: Some(command.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            startup_timeout_seconds,
            ..Self::default()
        }
    }

    fn docker(image: &str, args: &[&str], startup_timeout_seconds: u64) -> Self {
        Self {
            image: Some(image.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            startup_timeout_seconds,
            ..Self::default()
        }
    }

    pub fn is_docker(&self) -> bool {
        self.image.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendsConfig {
    pub k8sgpt: FileBackendConfig,
    pub eks_mcp: FileBackendConfig,
    pub cloudwatch: FileBackendConfig,
    pub dynamodb: FileBackendConfig,
}

impl Default for FileBackendsConfig {
    fn default() -> Self {
        Self {
            k8sgpt: FileBackendConfig::local("k8sgpt", &["serve", "--mcp"], 30),
            eks_mcp: FileBackendConfig::docker(
                "awslabs/eks-mcp-server:latest",
                &["--allow-sensitive-data-access"],
                120,
            ),
            cloudwatch: FileBackendConfig::docker("awslabs/cloudwatch-mcp-server:latest", &[], 120),
            dynamodb: FileBackendConfig::docker("awslabs/dynamodb-mcp-server:latest", &[], 120),
        }
    }
}

impl FileBackendsConfig {
    pub const IDS: [&'static str; 4] = ["k8sgpt", "eks_mcp", "cloudwatch", "dynamodb"];

    pub fn get(&self, id: &str) -> Option<&FileBackendConfig> {
        match id {
            "k8sgpt" => Some(&self.k8sgpt),
            "eks_mcp" => Some(&self.eks_mcp),
            "cloudwatch" => Some(&self.cloudwatch),
            "dynamodb" => Some(&self.dynamodb),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FileBackendConfig)> {
        Self::IDS
            .into_iter()
            .filter_map(move |id| self.get(id).map(|config| (id, config)))
    }
}
