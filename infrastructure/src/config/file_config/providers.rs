//! AWS and model configuration from TOML (`[aws]` and `[model]` sections)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAwsConfig {
    /// AWS region for Bedrock and the AWS tool servers (default: "us-east-1")
    pub region: String,
    /// AWS profile name for credentials
    pub profile: Option<String>,
}

impl Default for FileAwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Bedrock model or inference profile id
    pub model_id: String,
    /// Max tokens per response (default: 8192)
    pub max_tokens: u32,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            model_id: "us.anthropic.claude-sonnet-4-20250514-v1:0".to_string(),
            max_tokens: 8192,
        }
    }
}
