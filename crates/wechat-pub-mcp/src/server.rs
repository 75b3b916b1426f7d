// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! [`WechatPubMcpServer`] — the rmcp [`ServerHandler`] implementation.
//!
//! Only `tools/list` and `tools/call` are implemented; initialize, shutdown
//! and ping use the rmcp defaults.  Every `tools/call` returns a normal
//! result: business failures come back as error-flagged text, and a tool
//! task that panics is reported the same way.

use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParams, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use tracing::{debug, error};
use uuid::Uuid;
use wechat_pub_tools::{ToolCall, ToolOutput, ToolRegistry};

use crate::bridge::{output_to_call_result, schema_to_mcp_tool};

/// Name reported to clients in the `initialize` handshake.
pub const SERVER_NAME: &str = "wechat-pub";

const INSTRUCTIONS: &str = "Publishes local Markdown documents to a WeChat Official Account \
     as drafts. Call publish_to_wechat with a document_path (relative to the project root, \
     or absolute); the reply contains the draft id on success.";

/// Wraps a [`ToolRegistry`] and speaks the MCP protocol.
#[derive(Clone)]
pub struct WechatPubMcpServer {
    registry: Arc<ToolRegistry>,
}

impl WechatPubMcpServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for WechatPubMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let registry = self.registry.clone();
        async move {
            let tools = registry
                .schemas()
                .into_iter()
                .map(schema_to_mcp_tool)
                .collect();
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request
            .arguments
            .map(|m| serde_json::Value::Object(m.into_iter().collect()))
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        let call = ToolCall {
            id: Uuid::new_v4().to_string(),
            name: request.name.to_string(),
            args,
        };
        debug!(call_id = %call.id, tool = %call.name, "tools/call");

        let call_id = call.id.clone();
        let registry = self.registry.clone();
        let output = match tokio::spawn(async move { registry.execute(&call).await }).await {
            Ok(output) => output,
            Err(e) => {
                error!(%call_id, "tool task failed: {e}");
                ToolOutput::err(call_id, format!("Error: {e}"))
            }
        };
        Ok(output_to_call_result(output))
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
//
// The list_tools / call_tool round-trips need a live transport and are
// covered in tests/integration.rs.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_info_enables_tools_only() {
        let server = WechatPubMcpServer::new(Arc::new(ToolRegistry::new()));
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }

    #[test]
    fn get_info_reports_own_name_and_version() {
        let server = WechatPubMcpServer::new(Arc::new(ToolRegistry::new()));
        let info = server.get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn get_info_has_instructions() {
        let server = WechatPubMcpServer::new(Arc::new(ToolRegistry::new()));
        let info = server.get_info();
        assert!(info.instructions.unwrap_or_default().contains("publish_to_wechat"));
    }
}
