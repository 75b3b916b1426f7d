// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! `wechat-pub-mcp` — MCP (Model Context Protocol) server for publishing
//! Markdown documents to a WeChat Official Account.
//!
//! Exposes a single tool, `publish_to_wechat`, over **stdio** transport using
//! line-delimited JSON-RPC.
//!
//! # MCP client configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "wechat-pub": {
//!       "command": "wechat-pub",
//!       "args": ["--plugin-dir", "/path/to/plugins/wechat_pub", "serve"]
//!     }
//!   }
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! MCP client (Cursor, Claude Desktop, …)
//!       │  stdin/stdout (line-delimited JSON-RPC)
//!       ▼
//! WechatPubMcpServer (rmcp ServerHandler)
//!       │
//!       ▼
//! ToolRegistry  ──►  PublishTool  ──►  worker subprocess
//! ```

pub mod bridge;
pub mod registry;
pub mod server;

pub use registry::build_mcp_registry;
pub use server::WechatPubMcpServer;

use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use wechat_pub_tools::ToolRegistry;

/// Start an MCP stdio server, serving the tools in `registry` on
/// `stdin` / `stdout`.
///
/// Returns when the client disconnects (stdin EOF).
///
/// # Errors
///
/// Returns an error if the rmcp transport fails to initialize or if the
/// server encounters a fatal I/O error.
pub async fn serve_stdio(registry: Arc<ToolRegistry>) -> Result<()> {
    let server = WechatPubMcpServer::new(registry);
    let running = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .map_err(|e| anyhow::anyhow!("MCP server init error: {e}"))?;
    running
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))?;
    Ok(())
}
