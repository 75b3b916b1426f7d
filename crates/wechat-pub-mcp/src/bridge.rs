// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Conversions between the tool layer and rmcp's MCP model types.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject, Tool as McpTool};
use tracing::debug;
use wechat_pub_tools::{ToolOutput, ToolSchema};

/// Convert a [`ToolSchema`] into an rmcp [`McpTool`] descriptor.
pub fn schema_to_mcp_tool(schema: ToolSchema) -> McpTool {
    let input_schema: JsonObject = value_to_object(schema.parameters);
    McpTool::new(
        std::borrow::Cow::Owned(schema.name),
        std::borrow::Cow::Owned(schema.description),
        Arc::new(input_schema),
    )
}

/// MCP requires the input schema to be a JSON object; anything else is
/// wrapped in a minimal `{"type":"object"}` envelope.
fn value_to_object(v: serde_json::Value) -> JsonObject {
    use serde_json::{Map, Value};
    match v {
        Value::Object(m) => m,
        other => {
            let mut m = Map::new();
            m.insert("type".to_string(), Value::String("object".to_string()));
            m.insert("value".to_string(), other);
            m
        }
    }
}

/// Convert a [`ToolOutput`] into a single-text-part [`CallToolResult`].
///
/// Failures stay on the normal result path with `is_error` set; they are
/// never turned into JSON-RPC errors.
pub fn output_to_call_result(output: ToolOutput) -> CallToolResult {
    debug!(call_id = %output.call_id, is_error = output.is_error, "tools/call finished");
    let content = vec![Content::text(output.content)];
    if output.is_error {
        CallToolResult {
            content,
            is_error: Some(true),
            structured_content: None,
            meta: None,
        }
    } else {
        CallToolResult::success(content)
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
