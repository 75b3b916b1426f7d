// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
mod error;
mod publish;
mod registry;
mod tool;
pub mod worker;

pub use error::{BuildError, PublishError};
pub use publish::{PublishTool, TOOL_NAME};
pub use registry::{ToolRegistry, ToolSchema};
pub use tool::{Tool, ToolCall, ToolOutput};
pub use worker::{BuildCommand, PublishOutcome, WorkerResolver};
