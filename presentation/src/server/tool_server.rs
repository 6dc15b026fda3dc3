//! Newline-delimited JSON-RPC server exposing the `sherlock` tool

use crate::output::console::ConsoleFormatter;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use sherlock_application::{
    InvestigateUseCase, InvestigationError, InvestigationInput, InvestigationOutput,
};
use sherlock_domain::DiagnosticBackend;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Name of the one tool this server offers
pub const SHERLOCK_TOOL: &str = "sherlock";

const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Something that can run an investigation
#[async_trait]
pub trait InvestigationService: Send + Sync {
    async fn investigate(
        &self,
        input: InvestigationInput,
    ) -> Result<InvestigationOutput, InvestigationError>;
}

#[async_trait]
impl InvestigationService for InvestigateUseCase {
    async fn investigate(
        &self,
        input: InvestigationInput,
    ) -> Result<InvestigationOutput, InvestigationError> {
        self.execute(input).await
    }
}

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SherlockArguments {
    query: String,
    #[serde(default)]
    diagnostic_agent: Option<String>,
}

struct RpcFailure {
    code: i64,
    message: String,
}

impl RpcFailure {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Stdio tool server
pub struct ToolServer {
    service: Arc<dyn InvestigationService>,
}

impl ToolServer {
    pub fn new(service: Arc<dyn InvestigationService>) -> Self {
        Self { service }
    }

    /// Serve until `reader` reaches end of input.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Tool server ready");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_line(&line).await {
                let mut text = serde_json::to_string(&reply).map_err(std::io::Error::other)?;
                text.push('\n');
                writer.write_all(text.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Tool server input closed");
        Ok(())
    }

    /// Handle one line; notifications produce no reply.
    async fn handle_line(&self, line: &str) -> Option<Value> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparseable request");
                return Some(error_response(
                    Value::Null,
                    RpcFailure::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    RpcFailure::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                ));
            }
        };

        let Some(id) = request.id.filter(|id| !id.is_null()) else {
            debug!(method = %request.method, "Notification");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(initialize_result()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": [tool_definition()] })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(RpcFailure::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        };

        Some(match outcome {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(failure) => error_response(id, failure),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcFailure> {
        let params: CallParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| RpcFailure::new(INVALID_PARAMS, format!("Invalid params: {}", e)))?;
        if params.name != SHERLOCK_TOOL {
            return Err(RpcFailure::new(
                INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            ));
        }

        let arguments: SherlockArguments =
            serde_json::from_value(params.arguments.unwrap_or_else(|| json!({})))
                .map_err(|e| RpcFailure::new(INVALID_PARAMS, format!("Invalid arguments: {}", e)))?;

        let backend = arguments
            .diagnostic_agent
            .unwrap_or_else(|| DiagnosticBackend::default().as_str().to_string());
        info!(diagnostic_agent = %backend, "Investigation requested");

        let input = InvestigationInput::new(arguments.query).with_backend(backend);
        let (text, is_error) = match self.service.investigate(input).await {
            Ok(output) => (output.report, false),
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "Investigation failed");
                (ConsoleFormatter::format_failure(&e), true)
            }
        };

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
        }))
    }
}

fn error_response(id: Value, failure: RpcFailure) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": failure.code, "message": failure.message },
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": "sherlock", "version": env!("CARGO_PKG_VERSION") },
    })
}

fn tool_definition() -> Value {
    json!({
        "name": SHERLOCK_TOOL,
        "description": "Investigate an SRE incident with a swarm of diagnostic, \
                        observability and persistence agents. Returns a Markdown report \
                        with one section per agent that contributed findings.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The incident or question to investigate"
                },
                "diagnostic_agent": {
                    "type": "string",
                    "enum": ["k8sgpt", "eks-mcp"],
                    "default": "k8sgpt",
                    "description": "Backend for Kubernetes diagnostics"
                }
            },
            "required": ["query"]
        }
    })
}
