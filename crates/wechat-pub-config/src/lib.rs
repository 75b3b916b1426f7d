// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Configuration for the wechat-pub MCP server.
//!
//! Two things live here:
//!
//! - [`CredentialStore`]: the `AppID` / `AppSecret` pair read once at startup
//!   from the plugin's `config.txt`.
//! - [`PluginLayout`]: where the plugin directory, the project root, the
//!   credentials file and the worker executables are on disk.

mod credentials;
mod layout;

pub use credentials::{parse_credentials, CredentialStore, Credentials};
pub use layout::{PluginLayout, DEFAULT_BUILD_TIMEOUT_SECS, DEFAULT_WORKER_NAME};
