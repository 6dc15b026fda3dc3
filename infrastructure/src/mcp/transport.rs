//! Framing and message classification for MCP stdio.
//!
//! MCP over stdio carries one JSON-RPC message per line. Messages must not
//! contain embedded newlines, which `serde_json::to_string` guarantees.

use super::error::{McpError, Result};
use futures::SinkExt;
use serde::Serialize;
use tokio::io::AsyncWrite;
use tokio_util::codec::{FramedWrite, LinesCodec};

/// Upper bound on one incoming line. Tool catalogs of the AWS servers are
/// large but stay well below this.
pub const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

pub fn lines_codec() -> LinesCodec {
    LinesCodec::new_with_max_length(MAX_LINE_LENGTH)
}

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq)]
pub enum MessageKind {
    /// A response to a request we sent (numeric `id`, no `method`)
    Response { id: u64 },
    /// A request from the server, e.g. `ping`. The id is echoed verbatim.
    IncomingRequest {
        id: serde_json::Value,
        method: String,
    },
    /// A notification (has `method`, no `id`), e.g. `notifications/message`
    Notification,
    /// Anything else: a response with a foreign id, or not JSON-RPC at all
    Unroutable,
}

/// Classify a JSON-RPC message by inspecting its `id` and `method` fields.
pub fn classify_message(json: &serde_json::Value) -> MessageKind {
    let id = json.get("id").filter(|v| !v.is_null());
    let method = json.get("method").and_then(|v| v.as_str());

    match (id, method) {
        (Some(id), Some(method)) => MessageKind::IncomingRequest {
            id: id.clone(),
            method: method.to_string(),
        },
        (Some(id), None) => match id.as_u64() {
            Some(id) => MessageKind::Response { id },
            None => MessageKind::Unroutable,
        },
        (None, Some(_)) => MessageKind::Notification,
        (None, None) => MessageKind::Unroutable,
    }
}

/// Serialize `message` and write it as one line.
pub async fn write_message<W, T>(writer: &mut FramedWrite<W, LinesCodec>, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let line = serde_json::to_string(message)?;
    writer.send(line).await.map_err(McpError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_util::codec::FramedRead;

    #[test]
    fn classify_response() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": 3, "result": {}});
        assert_eq!(classify_message(&json), MessageKind::Response { id: 3 });
    }

    #[test]
    fn classify_ping_with_string_id() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": "srv-1", "method": "ping"});
        assert_eq!(
            classify_message(&json),
            MessageKind::IncomingRequest {
                id: serde_json::json!("srv-1"),
                method: "ping".into()
            }
        );
    }

    #[test]
    fn classify_notification() {
        let json = serde_json::json!({"jsonrpc": "2.0", "method": "notifications/message", "params": {}});
        assert_eq!(classify_message(&json), MessageKind::Notification);
    }

    #[test]
    fn classify_null_id_error_is_unroutable() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}});
        assert_eq!(classify_message(&json), MessageKind::Unroutable);
    }

    #[tokio::test]
    async fn test_write_message_is_one_line() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = FramedWrite::new(client, lines_codec());
        let message = serde_json::json!({"text": "multi\nline"});
        write_message(&mut writer, &message).await.unwrap();
        drop(writer);

        let mut reader = FramedRead::new(server, lines_codec());
        let line = reader.next().await.unwrap().unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(decoded["text"], "multi\nline");
        assert!(reader.next().await.is_none());
    }
}
