//! Type conversions between AWS Bedrock SDK and domain types
//!
//! Converts Bedrock Converse API responses to domain `LlmResponse`,
//! and domain tool types to Bedrock request formats.

use aws_sdk_bedrockruntime::types as bedrock;
use aws_smithy_types::Document;
use sherlock_application::{GatewayError, ToolResultMessage};
use sherlock_domain::{ContentBlock, LlmResponse, OperationDescriptor, StopReason};
use std::collections::HashMap;

// ─── Bedrock → Domain ────────────────────────────────────────────

/// Convert Bedrock stop reason to domain StopReason.
pub fn convert_stop_reason(reason: &bedrock::StopReason) -> StopReason {
    match reason {
        bedrock::StopReason::EndTurn => StopReason::EndTurn,
        bedrock::StopReason::ToolUse => StopReason::ToolUse,
        bedrock::StopReason::MaxTokens => StopReason::MaxTokens,
        other => StopReason::Other(format!("{:?}", other)),
    }
}

/// Convert a single Bedrock content block to a domain ContentBlock.
///
/// Returns `None` for unsupported block types (Image, GuardContent, etc.).
pub fn convert_content_block(block: &bedrock::ContentBlock) -> Option<ContentBlock> {
    match block {
        bedrock::ContentBlock::Text(text) => Some(ContentBlock::Text(text.clone())),
        bedrock::ContentBlock::ToolUse(tool_use) => {
            let input = document_to_json(tool_use.input());
            let input_map = match input {
                serde_json::Value::Object(map) => map
                    .into_iter()
                    .collect::<HashMap<String, serde_json::Value>>(),
                _ => HashMap::new(),
            };
            Some(ContentBlock::ToolUse {
                id: tool_use.tool_use_id().to_string(),
                name: tool_use.name().to_string(),
                input: input_map,
            })
        }
        // Skip Image, GuardContent, Document, etc.
        _ => None,
    }
}

/// Convert a Bedrock ConverseOutput to a domain LlmResponse.
pub fn convert_converse_output(
    output: &bedrock::ConverseOutput,
    stop_reason: &bedrock::StopReason,
    model_id: &str,
) -> LlmResponse {
    let content = match output {
        bedrock::ConverseOutput::Message(message) => message
            .content()
            .iter()
            .filter_map(convert_content_block)
            .collect(),
        _ => return LlmResponse::from_text(""),
    };

    LlmResponse {
        content,
        stop_reason: Some(convert_stop_reason(stop_reason)),
        model: Some(model_id.to_string()),
    }
}

// ─── Domain → Bedrock ────────────────────────────────────────────

fn build_error(what: &str, e: impl std::fmt::Display) -> GatewayError {
    GatewayError::RequestFailed(format!("Failed to build {}: {}", what, e))
}

/// Build a conversation message from content blocks.
pub fn build_message(
    role: bedrock::ConversationRole,
    content: Vec<bedrock::ContentBlock>,
) -> Result<bedrock::Message, GatewayError> {
    bedrock::Message::builder()
        .role(role)
        .set_content(Some(content))
        .build()
        .map_err(|e| build_error("message", e))
}

/// Convert an LlmResponse back to Bedrock ContentBlocks for history tracking.
pub fn response_to_content_blocks(
    response: &LlmResponse,
) -> Result<Vec<bedrock::ContentBlock>, GatewayError> {
    response
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text(text) => Ok(bedrock::ContentBlock::Text(text.clone())),
            ContentBlock::ToolUse { id, name, input } => {
                let input_doc = json_to_document(&serde_json::json!(input));
                bedrock::ToolUseBlock::builder()
                    .tool_use_id(id)
                    .name(name)
                    .input(input_doc)
                    .build()
                    .map(bedrock::ContentBlock::ToolUse)
                    .map_err(|e| build_error("tool use block", e))
            }
        })
        .collect()
}

/// Convert a domain ToolResultMessage to a Bedrock ContentBlock::ToolResult.
pub fn convert_tool_result(result: &ToolResultMessage) -> Result<bedrock::ContentBlock, GatewayError> {
    let status = if result.is_error {
        bedrock::ToolResultStatus::Error
    } else {
        bedrock::ToolResultStatus::Success
    };

    let content = bedrock::ToolResultContentBlock::Text(result.output.clone());

    bedrock::ToolResultBlock::builder()
        .tool_use_id(&result.tool_use_id)
        .status(status)
        .content(content)
        .build()
        .map(bedrock::ContentBlock::ToolResult)
        .map_err(|e| build_error("tool result", e))
}

/// Convert an operation descriptor to a Bedrock Tool::ToolSpec.
pub fn convert_tool_spec(op: &OperationDescriptor) -> Result<bedrock::Tool, GatewayError> {
    let mut builder = bedrock::ToolSpecification::builder()
        .name(&op.name)
        .input_schema(bedrock::ToolInputSchema::Json(json_to_document(
            &op.input_schema,
        )));
    if !op.description.is_empty() {
        builder = builder.description(&op.description);
    }

    builder
        .build()
        .map(bedrock::Tool::ToolSpec)
        .map_err(|e| build_error("tool spec", e))
}

// ─── JSON ↔ Document helpers ─────────────────────────────────────

/// Convert a serde_json::Value to an aws_smithy_types::Document.
pub fn json_to_document(value: &serde_json::Value) -> Document {
    match value {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(*b),
        serde_json::Value::Number(n) => match (n.as_u64(), n.as_i64(), n.as_f64()) {
            (Some(u), _, _) => Document::Number(aws_smithy_types::Number::PosInt(u)),
            (None, Some(i), _) => Document::Number(aws_smithy_types::Number::NegInt(i)),
            (None, None, Some(f)) => Document::Number(aws_smithy_types::Number::Float(f)),
            _ => Document::Null,
        },
        serde_json::Value::String(s) => Document::String(s.clone()),
        serde_json::Value::Array(arr) => {
            Document::Array(arr.iter().map(json_to_document).collect())
        }
        serde_json::Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect(),
        ),
    }
}

/// Convert an aws_smithy_types::Document to a serde_json::Value.
pub fn document_to_json(doc: &Document) -> serde_json::Value {
    match doc {
        Document::Null => serde_json::Value::Null,
        Document::Bool(b) => serde_json::Value::Bool(*b),
        Document::Number(n) => match n {
            aws_smithy_types::Number::PosInt(i) => serde_json::json!(*i),
            aws_smithy_types::Number::NegInt(i) => serde_json::json!(*i),
            aws_smithy_types::Number::Float(f) => serde_json::Value::Number(
                serde_json::Number::from_f64(*f).unwrap_or_else(|| serde_json::Number::from(0)),
            ),
        },
        Document::String(s) => serde_json::Value::String(s.clone()),
        Document::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(document_to_json).collect())
        }
        Document::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert a Bedrock SDK error to a GatewayError.
pub fn convert_converse_error(
    err: &aws_sdk_bedrockruntime::error::SdkError<
        aws_sdk_bedrockruntime::operation::converse::ConverseError,
    >,
) -> GatewayError {
    use aws_sdk_bedrockruntime::operation::converse::ConverseError;

    match err {
        aws_sdk_bedrockruntime::error::SdkError::ServiceError(service_err) => {
            match service_err.err() {
                ConverseError::ThrottlingException(e) => {
                    GatewayError::RequestFailed(format!("Bedrock throttled: {}", e))
                }
                ConverseError::ModelNotReadyException(e) => {
                    GatewayError::ModelNotAvailable(format!("Bedrock model not ready: {}", e))
                }
                ConverseError::ValidationException(e) => {
                    GatewayError::RequestFailed(format!("Bedrock validation error: {}", e))
                }
                ConverseError::ModelTimeoutException(_) => GatewayError::Timeout,
                other => GatewayError::RequestFailed(format!("Bedrock error: {:?}", other)),
            }
        }
        other => GatewayError::ConnectionError(format!("Bedrock SDK error: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_stop_reasons() {
        let cases = [
            (bedrock::StopReason::EndTurn, StopReason::EndTurn),
            (bedrock::StopReason::ToolUse, StopReason::ToolUse),
            (bedrock::StopReason::MaxTokens, StopReason::MaxTokens),
        ];
        for (reason, expected) in cases {
            assert_eq!(convert_stop_reason(&reason), expected);
        }
        assert!(matches!(
            convert_stop_reason(&bedrock::StopReason::GuardrailIntervened),
            StopReason::Other(_)
        ));
    }

    #[test]
    fn test_convert_text_content_block() {
        let block = bedrock::ContentBlock::Text("hello".to_string());
        let result = convert_content_block(&block).unwrap();
        assert!(matches!(result, ContentBlock::Text(ref t) if t == "hello"));
    }

    #[test]
    fn test_json_document_roundtrip() {
        let original = serde_json::json!({
            "name": "test",
            "count": 42,
            "nested": { "flag": true },
            "items": [1, 2, 3],
            "offset": -5,
            "ratio": 0.5
        });
        let doc = json_to_document(&original);
        let back = document_to_json(&doc);
        assert_eq!(original, back);
    }

    #[test]
    fn test_convert_tool_use_block() {
        let block = bedrock::ContentBlock::ToolUse(
            bedrock::ToolUseBlock::builder()
                .tool_use_id("tooluse_1")
                .name("get_metric_data")
                .input(json_to_document(&serde_json::json!({"namespace": "AWS/DynamoDB"})))
                .build()
                .unwrap(),
        );
        match convert_content_block(&block).unwrap() {
            ContentBlock::ToolUse { id, name, input } => {
                assert_eq!(id, "tooluse_1");
                assert_eq!(name, "get_metric_data");
                assert_eq!(input["namespace"], "AWS/DynamoDB");
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_convert_tool_result_error_status() {
        let result = ToolResultMessage {
            tool_use_id: "tooluse_2".to_string(),
            tool_name: "describe_table".to_string(),
            output: "[EXECUTION_FAILED] Table not found: orders".to_string(),
            is_error: true,
        };
        match convert_tool_result(&result).unwrap() {
            bedrock::ContentBlock::ToolResult(block) => {
                assert_eq!(block.tool_use_id(), "tooluse_2");
                assert_eq!(block.status(), Some(&bedrock::ToolResultStatus::Error));
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_convert_tool_spec() {
        let op = OperationDescriptor::new("handoff_to_agent", "Hand off").with_schema(
            serde_json::json!({
                "type": "object",
                "properties": {"agent_name": {"type": "string", "enum": ["persistence_agent"]}},
                "required": ["agent_name"]
            }),
        );
        match convert_tool_spec(&op).unwrap() {
            bedrock::Tool::ToolSpec(spec) => {
                assert_eq!(spec.name(), "handoff_to_agent");
                assert_eq!(spec.description(), Some("Hand off"));
            }
            other => panic!("unexpected tool: {:?}", other),
        }
    }

    #[test]
    fn test_response_history_blocks() {
        let mut input = HashMap::new();
        input.insert("agent_name".to_string(), serde_json::json!("observability_agent"));
        let response = LlmResponse {
            content: vec![
                ContentBlock::Text("Pods are healthy.".into()),
                ContentBlock::ToolUse {
                    id: "t1".into(),
                    name: "handoff_to_agent".into(),
                    input,
                },
            ],
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        };
        let blocks = response_to_content_blocks(&response).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[1], bedrock::ContentBlock::ToolUse(_)));
    }
}
