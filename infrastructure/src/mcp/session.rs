//! MCP stdio session: one child process per tool provider.
//!
//! The session owns the child and a background reader task. Requests are
//! correlated with responses through a map of pending oneshot senders keyed
//! by request id; the reader task resolves them as replies arrive, answers
//! server-initiated `ping`s and forwards the child's stderr to the log.

use super::error::{McpError, Result};
use super::protocol::{
    CallToolResult, InitializeParams, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    JsonRpcResponseOut, ListToolsResult,
};
use super::transport::{MessageKind, classify_message, lines_codec, write_message};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use sherlock_domain::{
    OperationDescriptor, SessionError, ToolCall, ToolCatalog, ToolError, ToolResult, ToolSession,
};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, trace, warn};

const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// How long a server gets to exit after its stdin is closed
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const MAX_LIST_PAGES: usize = 64;

/// How to start one MCP server.
#[derive(Debug, Clone)]
pub struct McpServerSpec {
    pub id: String,
    pub display_name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the child, on top of the inherited one
    pub env: Vec<(String, String)>,
    pub startup_timeout: Duration,
    pub request_timeout: Duration,
}

impl McpServerSpec {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Command line for log output
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;
/// `None` once stdin has been closed
type SharedWriter = Arc<AsyncMutex<Option<FramedWrite<ChildStdin, LinesCodec>>>>;

/// Cloneable handle for sending requests to one server.
#[derive(Clone)]
struct RpcChannel {
    server: Arc<str>,
    next_id: Arc<AtomicU64>,
    writer: SharedWriter,
    pending: PendingMap,
    request_timeout: Duration,
}

impl RpcChannel {
    fn pending(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<JsonRpcResponse>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn send<T: Serialize>(&self, message: &T) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(McpError::TransportClosed)?;
        write_message(writer, message).await
    }

    /// Send a request and wait for its response.
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);

        trace!(server = %self.server, id, method, "Sending request");
        if let Err(e) = self.send(&JsonRpcRequest::new(id, method, params)).await {
            self.pending().remove(&id);
            return Err(e);
        }

        let response = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(McpError::TransportClosed),
            Err(_) => {
                self.pending().remove(&id);
                return Err(McpError::Timeout(method.to_string()));
            }
        };

        if let Some(error) = response.error {
            return Err(McpError::RpcError {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| {
            McpError::UnexpectedResponse(format!("'{}' returned neither result nor error", method))
        })
    }

    async fn notify(&self, method: &str) -> Result<()> {
        self.send(&JsonRpcNotification::new(method)).await
    }

    /// Dropping the writer closes the child's stdin.
    async fn close_stdin(&self) {
        self.writer.lock().await.take();
    }
}

/// Background task: route every line the server prints on stdout.
async fn reader_loop(channel: RpcChannel, stdout: ChildStdout) {
    let mut lines = FramedRead::new(stdout, lines_codec());

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(server = %channel.server, error = %e, "Failed to read from MCP server");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let json: serde_json::Value = match serde_json::from_str(trimmed) {
            Ok(json) => json,
            Err(_) => {
                debug!(server = %channel.server, "Ignoring non-JSON output: {}", trimmed);
                continue;
            }
        };

        match classify_message(&json) {
            MessageKind::Response { id } => {
                let Some(tx) = channel.pending().remove(&id) else {
                    debug!(server = %channel.server, id, "Response for unknown request");
                    continue;
                };
                match serde_json::from_value::<JsonRpcResponse>(json) {
                    Ok(response) => {
                        let _ = tx.send(response);
                    }
                    Err(e) => {
                        warn!(server = %channel.server, id, error = %e, "Malformed response");
                    }
                }
            }
            MessageKind::IncomingRequest { id, method } => {
                let reply = if method == "ping" {
                    JsonRpcResponseOut::result(id, serde_json::json!({}))
                } else {
                    debug!(server = %channel.server, method = %method, "Rejecting server request");
                    JsonRpcResponseOut::method_not_found(id, &method)
                };
                if let Err(e) = channel.send(&reply).await {
                    debug!(server = %channel.server, error = %e, "Failed to answer server request");
                }
            }
            MessageKind::Notification => {
                trace!(server = %channel.server, message = %json, "Notification");
            }
            MessageKind::Unroutable => {
                debug!(server = %channel.server, message = %json, "Unroutable message");
            }
        }
    }

    debug!(server = %channel.server, "MCP server closed stdout");
    // Waiters see a closed channel instead of hanging until their timeout
    channel.pending().clear();
}

async fn stderr_loop(server: Arc<str>, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(server = %server, "stderr: {}", line);
    }
}

struct Connection {
    child: Child,
    channel: RpcChannel,
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[derive(Debug)]
enum Lifecycle {
    Idle,
    Open(ToolCatalog),
    Closed,
}

/// [`ToolSession`] backed by an MCP server speaking stdio.
pub struct McpStdioSession {
    spec: McpServerSpec,
    lifecycle: Mutex<Lifecycle>,
    connection: AsyncMutex<Option<Connection>>,
}

impl McpStdioSession {
    pub fn new(spec: McpServerSpec) -> Self {
        Self {
            spec,
            lifecycle: Mutex::new(Lifecycle::Idle),
            connection: AsyncMutex::new(None),
        }
    }

    pub fn spec(&self) -> &McpServerSpec {
        &self.spec
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn channel(&self) -> std::result::Result<RpcChannel, SessionError> {
        match &*self.lifecycle() {
            Lifecycle::Idle => return Err(SessionError::NotOpen),
            Lifecycle::Closed => return Err(SessionError::Closed),
            Lifecycle::Open(_) => {}
        }
        self.connection
            .lock()
            .await
            .as_ref()
            .map(|c| c.channel.clone())
            .ok_or(SessionError::Closed)
    }

    /// Spawn the child and start the background tasks.
    async fn start(&self) -> Result<RpcChannel> {
        let program = which::which(&self.spec.command)
            .map_err(|_| McpError::CommandNotFound(self.spec.command.clone()))?;

        debug!(
            server = %self.spec.id,
            command = %self.spec.command_line(),
            "Spawning MCP server"
        );

        let mut cmd = Command::new(program);
        cmd.args(&self.spec.args)
            .envs(self.spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(McpError::SpawnError)?;

        let capture = |what: &str| {
            McpError::SpawnError(std::io::Error::other(format!("Failed to capture {}", what)))
        };
        let stdin = child.stdin.take().ok_or_else(|| capture("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| capture("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| capture("stderr"))?;

        let channel = RpcChannel {
            server: Arc::from(self.spec.id.as_str()),
            next_id: Arc::new(AtomicU64::new(1)),
            writer: Arc::new(AsyncMutex::new(Some(FramedWrite::new(stdin, lines_codec())))),
            pending: Arc::new(Mutex::new(HashMap::new())),
            request_timeout: self.spec.request_timeout,
        };

        let tasks = vec![
            tokio::spawn(reader_loop(channel.clone(), stdout)),
            tokio::spawn(stderr_loop(channel.server.clone(), stderr)),
        ];

        *self.connection.lock().await = Some(Connection {
            child,
            channel: channel.clone(),
            tasks,
        });

        Ok(channel)
    }

    /// `initialize`, `notifications/initialized`, then every page of `tools/list`.
    async fn handshake(&self, channel: &RpcChannel) -> Result<ToolCatalog> {
        let init = channel
            .request(
                "initialize",
                Some(serde_json::to_value(InitializeParams::default())?),
            )
            .await?;

        let server_name = init
            .get("serverInfo")
            .and_then(|info| info.get("name"))
            .and_then(|name| name.as_str())
            .unwrap_or("unknown");
        let protocol = init
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        debug!(server = %self.spec.id, server_name, protocol, "MCP server initialized");

        channel.notify("notifications/initialized").await?;

        let mut operations: Vec<OperationDescriptor> = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_LIST_PAGES {
            let params = cursor.as_ref().map(|c| serde_json::json!({ "cursor": c }));
            let page: ListToolsResult =
                serde_json::from_value(channel.request("tools/list", params).await?)?;
            operations.extend(page.tools.into_iter().map(OperationDescriptor::from));

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(ToolCatalog::new(operations)),
            }
        }

        Err(McpError::UnexpectedResponse(format!(
            "tools/list did not finish within {} pages",
            MAX_LIST_PAGES
        )))
    }

    /// Close stdin, give the child a grace period, then kill it.
    async fn shutdown(&self) {
        let Some(mut conn) = self.connection.lock().await.take() else {
            return;
        };

        conn.channel.close_stdin().await;
        match tokio::time::timeout(SHUTDOWN_GRACE, conn.child.wait()).await {
            Ok(Ok(status)) => debug!(server = %self.spec.id, %status, "MCP server exited"),
            Ok(Err(e)) => warn!(server = %self.spec.id, error = %e, "Failed to wait for MCP server"),
            Err(_) => {
                warn!(
                    server = %self.spec.id,
                    "MCP server did not exit within {:?}; killing",
                    SHUTDOWN_GRACE
                );
                if let Err(e) = conn.child.kill().await {
                    warn!(server = %self.spec.id, error = %e, "Failed to kill MCP server");
                }
            }
        }
        conn.channel.pending().clear();
    }
}

#[async_trait]
impl ToolSession for McpStdioSession {
    fn id(&self) -> &str {
        &self.spec.id
    }

    fn display_name(&self) -> &str {
        &self.spec.display_name
    }

    fn startup_timeout(&self) -> Duration {
        self.spec.startup_timeout
    }

    async fn open(&self) -> std::result::Result<ToolCatalog, SessionError> {
        match &*self.lifecycle() {
            Lifecycle::Open(catalog) => return Ok(catalog.clone()),
            Lifecycle::Closed => return Err(SessionError::Closed),
            Lifecycle::Idle => {}
        }

        let channel = self.start().await?;
        let catalog = match self.handshake(&channel).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(server = %self.spec.id, error = %e, "MCP handshake failed");
                self.shutdown().await;
                return Err(e.into());
            }
        };

        if catalog.is_empty() {
            self.shutdown().await;
            return Err(SessionError::EmptyCatalog);
        }

        info!(
            server = %self.spec.id,
            operations = catalog.len(),
            "MCP session open"
        );
        *self.lifecycle() = Lifecycle::Open(catalog.clone());
        Ok(catalog)
    }

    fn list_operations(&self) -> std::result::Result<ToolCatalog, SessionError> {
        match &*self.lifecycle() {
            Lifecycle::Idle => Err(SessionError::NotOpen),
            Lifecycle::Open(catalog) => Ok(catalog.clone()),
            Lifecycle::Closed => Err(SessionError::Closed),
        }
    }

    async fn invoke(&self, call: &ToolCall) -> std::result::Result<ToolResult, SessionError> {
        let channel = self.channel().await?;
        let params = serde_json::json!({
            "name": call.tool_name,
            "arguments": call.arguments_json(),
        });

        debug!(server = %self.spec.id, tool = %call.tool_name, "Calling MCP tool");
        match channel.request("tools/call", Some(params)).await {
            Ok(value) => {
                let result: CallToolResult = serde_json::from_value(value)
                    .map_err(|e| SessionError::Protocol(e.to_string()))?;
                let text = result.text();
                if result.is_error {
                    Ok(ToolResult::failure(
                        &call.tool_name,
                        ToolError::execution_failed(text),
                    ))
                } else {
                    Ok(ToolResult::success(&call.tool_name, text))
                }
            }
            // Unknown tool or bad arguments: information for the agent
            Err(McpError::RpcError { code, message }) => Ok(ToolResult::failure(
                &call.tool_name,
                ToolError::new(format!("RPC_{}", code), message),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&self) -> std::result::Result<(), SessionError> {
        let was_open = {
            let mut lifecycle = self.lifecycle();
            let was_open = matches!(*lifecycle, Lifecycle::Open(_));
            if was_open {
                *lifecycle = Lifecycle::Closed;
            }
            was_open
        };

        self.shutdown().await;
        if was_open {
            info!(server = %self.spec.id, "MCP session closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        matches!(*self.lifecycle(), Lifecycle::Open(_))
    }
}
