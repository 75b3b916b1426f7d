// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use thiserror::Error;

/// Why a worker build did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("build timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("build tool '{program}' was not found")]
    ToolchainMissing { program: String },

    #[error("build failed ({}): {stderr}", exit_label(.code))]
    Failed { code: Option<i32>, stderr: String },

    #[error("could not run build: {0}")]
    Io(String),
}

/// A publish request that stopped before the worker produced an outcome.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("document_path is required")]
    MissingDocumentPath,

    #[error(
        "AppID and AppSecret are not configured. Config file: {}",
        .config_file.display()
    )]
    ConfigurationMissing { config_file: PathBuf },

    #[error("document not found: {}", .path.display())]
    DocumentNotFound { path: PathBuf },

    #[error(
        "publishing worker is unavailable{}. Install Rust and cargo, then run \
         'cargo build --release' in {}",
        cause_label(.cause),
        .plugin_dir.display()
    )]
    ExecutableUnavailable {
        plugin_dir: PathBuf,
        cause: Option<BuildError>,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

fn cause_label(cause: &Option<BuildError>) -> String {
    match cause {
        Some(e) => format!(" ({e})"),
        None => String::new(),
    }
}
