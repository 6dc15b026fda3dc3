//! JSON-RPC and MCP message types.
//!
//! - **Requests** (client → server): `initialize`, `tools/list`, `tools/call`
//! - **Notifications** (client → server): `notifications/initialized`
//! - **Requests** (server → client): `ping`, answered with an empty result

use serde::{Deserialize, Serialize};
use sherlock_domain::OperationDescriptor;

/// MCP protocol revision this client speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no `id`, no response)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params: None,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Response sent to a server-initiated request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponseOut {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponseOut {
    pub fn result(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn method_not_found(id: serde_json::Value, method: &str) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code: -32601,
                message: format!("Method not found: {}", method),
                data: None,
            }),
        }
    }
}

/// Parameters of `initialize`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: &'static str,
    pub capabilities: serde_json::Value,
    pub client_info: ClientInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl Default for InitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            capabilities: serde_json::json!({}),
            client_info: ClientInfo {
                name: "sherlock",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

/// Tool as advertised by `tools/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Option<serde_json::Value>,
}

impl From<McpTool> for OperationDescriptor {
    fn from(tool: McpTool) -> Self {
        let op = OperationDescriptor::new(tool.name, tool.description.unwrap_or_default());
        match tool.input_schema {
            Some(schema) => op.with_schema(schema),
            None => op,
        }
    }
}

/// Result of `tools/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<McpTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One content item of a tool result
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallToolContent {
    Text { text: String },
    Image {
        #[serde(rename = "mimeType", default)]
        mime_type: String,
    },
    Resource { resource: serde_json::Value },
    #[serde(other)]
    Unknown,
}

/// Result of `tools/call`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<CallToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Flatten the content into text for the reasoning backend
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                CallToolContent::Text { text } => Some(text.clone()),
                CallToolContent::Image { mime_type } => Some(format!("[image: {}]", mime_type)),
                CallToolContent::Resource { resource } => Some(resource.to_string()),
                CallToolContent::Unknown => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = JsonRpcRequest::new(7, "tools/list", None);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert!(json.get("params").is_none());
    }

    #[test]
    fn test_initialize_params() {
        let json = serde_json::to_value(InitializeParams::default()).unwrap();
        assert_eq!(json["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(json["clientInfo"]["name"], "sherlock");
    }

    #[test]
    fn test_list_tools_result() {
        let result: ListToolsResult = serde_json::from_value(serde_json::json!({
            "tools": [
                {"name": "describe_alarms", "description": "List alarms",
                 "inputSchema": {"type": "object", "properties": {"state": {"type": "string"}}}},
                {"name": "get_metric_data"}
            ],
            "nextCursor": "page-2"
        }))
        .unwrap();
        assert_eq!(result.next_cursor.as_deref(), Some("page-2"));

        let ops: Vec<OperationDescriptor> = result.tools.into_iter().map(Into::into).collect();
        assert_eq!(ops[0].input_schema["properties"]["state"]["type"], "string");
        assert_eq!(ops[1].description, "");
        assert_eq!(ops[1].input_schema["type"], "object");
    }

    #[test]
    fn test_call_tool_result_text() {
        let result: CallToolResult = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Table orders: 1 RCU / 1 WCU"},
                {"type": "audio", "data": "..."},
                {"type": "text", "text": "ThrottledRequests: 412"}
            ],
            "isError": false
        }))
        .unwrap();
        assert!(!result.is_error);
        assert_eq!(
            result.text(),
            "Table orders: 1 RCU / 1 WCU\nThrottledRequests: 412"
        );
    }

    #[test]
    fn test_method_not_found_response() {
        let out = JsonRpcResponseOut::method_not_found(serde_json::json!("abc"), "sampling/createMessage");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["error"]["code"], -32601);
        assert!(json.get("result").is_none());
    }
}
