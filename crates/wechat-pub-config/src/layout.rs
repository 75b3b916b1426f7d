// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Binary name produced by building the publishing worker.
pub const DEFAULT_WORKER_NAME: &str = "wechat_client";

/// Upper bound on a single worker build.
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;

/// File name of the credentials file inside the plugin directory.
const CONFIG_FILE_NAME: &str = "config.txt";

/// Filesystem layout of an installed plugin.
///
/// ```text
/// <project_root>/              relative document paths resolve here
///   └── <a>/
///       └── <plugin_dir>/
///             ├── config.txt
///             └── target/{release,debug}/<worker_name>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginLayout {
    pub plugin_dir: PathBuf,
    pub project_root: PathBuf,
    pub config_file: PathBuf,
    pub worker_name: String,
    pub build_timeout_secs: u64,
}

impl PluginLayout {
    /// Default layout rooted at `plugin_dir`.
    ///
    /// A relative `plugin_dir` is made absolute against the current working
    /// directory.  The project root is two levels above the plugin dir, or
    /// the plugin dir itself when it is too close to the filesystem root.
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        let plugin_dir = absolutize(plugin_dir.into());
        let project_root = plugin_dir
            .ancestors()
            .nth(2)
            .unwrap_or(&plugin_dir)
            .to_path_buf();
        let config_file = plugin_dir.join(CONFIG_FILE_NAME);
        Self {
            plugin_dir,
            project_root,
            config_file,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            build_timeout_secs: DEFAULT_BUILD_TIMEOUT_SECS,
        }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = absolutize(root.into());
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = absolutize(path.into());
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn with_build_timeout_secs(mut self, secs: u64) -> Self {
        self.build_timeout_secs = secs;
        self
    }

    /// Resolve a document path supplied by the caller.
    ///
    /// Absolute paths are returned unchanged; relative ones are joined onto
    /// the project root.  Existence is not checked here.
    pub fn resolve_document(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn release_worker(&self) -> PathBuf {
        self.worker_in("release")
    }

    pub fn debug_worker(&self) -> PathBuf {
        self.worker_in("debug")
    }

    /// Worker locations in lookup order: release first, then debug.
    pub fn worker_candidates(&self) -> [PathBuf; 2] {
        [self.release_worker(), self.debug_worker()]
    }

    fn worker_in(&self, profile: &str) -> PathBuf {
        let file = format!("{}{}", self.worker_name, std::env::consts::EXE_SUFFIX);
        self.plugin_dir.join("target").join(profile).join(file)
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
