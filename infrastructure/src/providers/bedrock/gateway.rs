//! Bedrock reasoning gateway
//!
//! Handles AWS credential initialization and hands out one
//! [`BedrockSession`] per agent activation.

use super::session::BedrockSession;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use sherlock_application::{GatewayError, LlmGateway, LlmSession};
use std::sync::Arc;
use tracing::info;

/// Settings for [`BedrockLlmGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedrockConfig {
    pub region: String,
    pub profile: Option<String>,
    pub model_id: String,
    pub max_tokens: u32,
}

pub struct BedrockLlmGateway {
    client: Arc<BedrockClient>,
    model_id: String,
    max_tokens: i32,
}

impl BedrockLlmGateway {
    /// Create a gateway from the ambient AWS credential chain.
    pub async fn new(config: &BedrockConfig) -> Result<Self, GatewayError> {
        if config.model_id.trim().is_empty() {
            return Err(GatewayError::ModelNotAvailable(
                "model id cannot be empty".to_string(),
            ));
        }

        let mut aws_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(ref profile) = config.profile {
            aws_config_loader = aws_config_loader.profile_name(profile);
        }

        let aws_config = aws_config_loader.load().await;
        let client = BedrockClient::new(&aws_config);

        info!(
            region = %config.region,
            model = %config.model_id,
            "Bedrock gateway initialized"
        );

        Ok(Self {
            client: Arc::new(client),
            model_id: config.model_id.clone(),
            max_tokens: i32::try_from(config.max_tokens).unwrap_or(i32::MAX),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl LlmGateway for BedrockLlmGateway {
    async fn create_session(
        &self,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(BedrockSession::new(
            self.client.clone(),
            self.model_id.clone(),
            Some(system_prompt.to_string()),
            self.max_tokens,
        )))
    }
}
