//! LLM-backed swarm agent
//!
//! Each activation starts a fresh conversation: the agent's directive is the
//! system prompt and the rendered shared context is the first user message.
//! The model is offered its session's operations plus a synthetic hand-off
//! tool, and the native tool-use loop runs until the model either stops
//! calling tools (an answer) or calls the hand-off tool.

use crate::ports::llm_gateway::{LlmGateway, ToolResultMessage};
use crate::ports::swarm_agent::{AgentError, AgentFactory, SwarmAgent};
use async_trait::async_trait;
use futures::future::join_all;
use sherlock_domain::prompt::directives::{self, HANDOFF_TOOL};
use sherlock_domain::{
    AgentDescriptor, AgentDomain, AgentName, AgentOutcome, LlmResponse, OperationDescriptor,
    SessionError, SharedContext, ToolCall, ToolCatalog, ToolError, ToolSession,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Agent whose decisions come from a reasoning backend
pub struct LlmSwarmAgent<G: LlmGateway + 'static> {
    descriptor: AgentDescriptor,
    session: Arc<dyn ToolSession>,
    catalog: ToolCatalog,
    peers: Vec<AgentName>,
    gateway: Arc<G>,
    max_tool_turns: usize,
}

impl<G: LlmGateway + 'static> LlmSwarmAgent<G> {
    pub fn new(
        descriptor: AgentDescriptor,
        session: Arc<dyn ToolSession>,
        catalog: ToolCatalog,
        peers: Vec<AgentName>,
        gateway: Arc<G>,
        max_tool_turns: usize,
    ) -> Self {
        Self {
            descriptor,
            session,
            catalog,
            peers,
            gateway,
            max_tool_turns,
        }
    }

    /// Operations offered to the model
    fn tools(&self) -> Vec<OperationDescriptor> {
        let mut tools = self.catalog.operations().to_vec();
        if !self.peers.is_empty() {
            let names: Vec<&str> = self.peers.iter().map(|p| p.as_str()).collect();
            tools.push(
                OperationDescriptor::new(
                    HANDOFF_TOOL,
                    directives::handoff_tool_description(&self.peers),
                )
                .with_schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "agent_name": {
                            "type": "string",
                            "enum": names,
                            "description": "Agent to pass the investigation to"
                        },
                        "message": {
                            "type": "string",
                            "description": "Findings so far and what the next agent should check"
                        }
                    },
                    "required": ["agent_name", "message"]
                })),
            );
        }
        tools
    }

    fn hand_off(&self, call: &ToolCall, response: &LlmResponse) -> Result<AgentOutcome, AgentError> {
        let target = call
            .require_string("agent_name")
            .map_err(AgentError::MalformedHandOff)?;
        let rationale = call
            .get_string("message")
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| response.text_content());
        info!(agent = %self.descriptor.name, to = target, "Requesting hand-off");
        Ok(AgentOutcome::hand_off(target, rationale))
    }

    async fn run_tool(&self, call: &ToolCall) -> Result<ToolResultMessage, SessionError> {
        let tool_use_id = call
            .native_id
            .clone()
            .unwrap_or_else(|| call.tool_name.clone());

        if !self.catalog.contains(&call.tool_name) {
            debug!(tool = %call.tool_name, "Model called an operation outside the catalog");
            return Ok(ToolResultMessage {
                tool_use_id,
                tool_name: call.tool_name.clone(),
                output: ToolError::not_found(format!("operation '{}'", call.tool_name)).to_string(),
                is_error: true,
            });
        }

        debug!(tool = %call.tool_name, session = self.session.id(), "Invoking tool");
        let result = self.session.invoke(call).await?;
        Ok(ToolResultMessage {
            tool_use_id,
            tool_name: call.tool_name.clone(),
            output: result.as_feedback(),
            is_error: !result.is_success(),
        })
    }
}

#[async_trait]
impl<G: LlmGateway + 'static> SwarmAgent for LlmSwarmAgent<G> {
    fn name(&self) -> &AgentName {
        &self.descriptor.name
    }

    fn domain(&self) -> AgentDomain {
        self.descriptor.domain
    }

    async fn act(&self, context: &SharedContext) -> Result<AgentOutcome, AgentError> {
        let system_prompt = directives::system_prompt(&self.descriptor, &self.peers);
        let llm = self.gateway.create_session(&system_prompt).await?;
        let tools = self.tools();

        let mut response = llm.send_with_tools(&context.render(), &tools).await?;
        let mut tool_turns = 0;

        loop {
            let calls = response.tool_calls();
            if calls.is_empty() {
                debug!(agent = %self.descriptor.name, "Answered after {} tool turns", tool_turns);
                return Ok(AgentOutcome::answer(response.text_content()));
            }

            if let Some(call) = calls.iter().find(|c| c.tool_name == HANDOFF_TOOL) {
                return self.hand_off(call, &response);
            }

            tool_turns += 1;
            if tool_turns > self.max_tool_turns {
                return Err(AgentError::TurnLimit(self.max_tool_turns));
            }

            // Calls within one turn are independent
            let results = join_all(calls.iter().map(|call| self.run_tool(call)))
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;

            response = llm.send_tool_results(&results).await?;
        }
    }
}

/// Builds [`LlmSwarmAgent`]s sharing one gateway
pub struct LlmAgentFactory<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    max_tool_turns: usize,
}

impl<G: LlmGateway + 'static> LlmAgentFactory<G> {
    pub fn new(gateway: Arc<G>, max_tool_turns: usize) -> Self {
        Self {
            gateway,
            max_tool_turns,
        }
    }
}

impl<G: LlmGateway + 'static> AgentFactory for LlmAgentFactory<G> {
    fn build(
        &self,
        descriptor: AgentDescriptor,
        session: Arc<dyn ToolSession>,
        catalog: ToolCatalog,
        peers: Vec<AgentName>,
    ) -> Arc<dyn SwarmAgent> {
        Arc::new(LlmSwarmAgent::new(
            descriptor,
            session,
            catalog,
            peers,
            self.gateway.clone(),
            self.max_tool_turns,
        ))
    }
}
