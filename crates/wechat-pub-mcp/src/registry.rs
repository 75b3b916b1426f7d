// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//!
//! The tool registry served by the MCP server.

use wechat_pub_tools::{PublishTool, ToolRegistry};

/// Build a [`ToolRegistry`] holding the publish tool.
pub fn build_mcp_registry(publish: PublishTool) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    reg.register(publish);
    reg
}

#[cfg(test)]
mod tests {
    use wechat_pub_config::PluginLayout;
    use wechat_pub_tools::TOOL_NAME;

    use super::*;

    #[test]
    fn registry_contains_exactly_the_publish_tool() {
        let dir = tempfile::tempdir().unwrap();
        let reg = build_mcp_registry(PublishTool::new(PluginLayout::new(dir.path())));
        assert_eq!(reg.names(), vec![TOOL_NAME]);
    }
}
