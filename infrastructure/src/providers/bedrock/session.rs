//! Bedrock conversation backing one agent activation
//!
//! The Converse API is stateless, so the whole exchange is replayed on
//! every turn. The operation list is fixed by the first turn that carries
//! one.

use super::types;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::types as bedrock;
use sherlock_application::{GatewayError, LlmSession, ToolResultMessage};
use sherlock_domain::{LlmResponse, OperationDescriptor};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct Conversation {
    messages: Vec<bedrock::Message>,
    tools: Option<bedrock::ToolConfiguration>,
}

pub struct BedrockSession {
    client: Arc<BedrockClient>,
    model_id: String,
    system: Vec<bedrock::SystemContentBlock>,
    max_tokens: i32,
    conversation: Mutex<Conversation>,
}

impl BedrockSession {
    pub fn new(
        client: Arc<BedrockClient>,
        model_id: String,
        system_prompt: Option<String>,
        max_tokens: i32,
    ) -> Self {
        let system = system_prompt
            .filter(|prompt| !prompt.is_empty())
            .map(bedrock::SystemContentBlock::Text)
            .into_iter()
            .collect();
        Self {
            client,
            model_id,
            system,
            max_tokens,
            conversation: Mutex::new(Conversation::default()),
        }
    }

    async fn converse(&self, conversation: &Conversation) -> Result<LlmResponse, GatewayError> {
        debug!(
            model = %self.model_id,
            turns = conversation.messages.len(),
            tools = conversation.tools.is_some(),
            "Calling Bedrock Converse API"
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .set_system(Some(self.system.clone()))
            .set_messages(Some(conversation.messages.clone()))
            .set_tool_config(conversation.tools.clone())
            .inference_config(
                bedrock::InferenceConfiguration::builder()
                    .max_tokens(self.max_tokens)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| types::convert_converse_error(&e))?;

        let output = response.output().ok_or_else(|| {
            GatewayError::RequestFailed("No output in Bedrock response".to_string())
        })?;
        Ok(types::convert_converse_output(
            output,
            response.stop_reason(),
            &self.model_id,
        ))
    }

    /// Record a user turn, call the model and record its reply
    async fn exchange(
        &self,
        content: Vec<bedrock::ContentBlock>,
        tools: Option<bedrock::ToolConfiguration>,
    ) -> Result<LlmResponse, GatewayError> {
        let mut conversation = self.conversation.lock().await;
        if conversation.tools.is_none() {
            conversation.tools = tools;
        }
        conversation
            .messages
            .push(types::build_message(bedrock::ConversationRole::User, content)?);

        let response = self.converse(&conversation).await?;

        let reply = types::response_to_content_blocks(&response)?;
        if !reply.is_empty() {
            conversation
                .messages
                .push(types::build_message(bedrock::ConversationRole::Assistant, reply)?);
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmSession for BedrockSession {
    fn model(&self) -> &str {
        &self.model_id
    }

    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[OperationDescriptor],
    ) -> Result<LlmResponse, GatewayError> {
        let tools = if tools.is_empty() {
            None
        } else {
            let specs = tools
                .iter()
                .map(types::convert_tool_spec)
                .collect::<Result<Vec<_>, _>>()?;
            Some(
                bedrock::ToolConfiguration::builder()
                    .set_tools(Some(specs))
                    .build()
                    .map_err(|e| {
                        GatewayError::RequestFailed(format!("Failed to build tool config: {}", e))
                    })?,
            )
        };

        self.exchange(vec![bedrock::ContentBlock::Text(content.to_string())], tools)
            .await
    }

    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError> {
        let content = results
            .iter()
            .map(types::convert_tool_result)
            .collect::<Result<Vec<_>, _>>()?;
        self.exchange(content, None).await
    }
}
