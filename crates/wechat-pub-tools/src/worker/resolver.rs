// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, error, info};
use wechat_pub_config::PluginLayout;

use crate::error::{BuildError, PublishError};

/// Command used to build the worker inside the plugin directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["build".to_string(), "--release".to_string()],
        }
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Finds the worker executable, building it on demand.
///
/// The first successful lookup is cached for the lifetime of the resolver
/// and is never re-validated, even if the file later disappears.
/// Concurrent first lookups may each trigger a build; the first path stored
/// wins.
#[derive(Debug)]
pub struct WorkerResolver {
    layout: PluginLayout,
    build: BuildCommand,
    cached: OnceLock<PathBuf>,
}

impl WorkerResolver {
    pub fn new(layout: PluginLayout) -> Self {
        Self {
            layout,
            build: BuildCommand::default(),
            cached: OnceLock::new(),
        }
    }

    pub fn with_build_command(mut self, build: BuildCommand) -> Self {
        self.build = build;
        self
    }

    pub fn build_command(&self) -> &BuildCommand {
        &self.build
    }

    /// The cached worker path, if one has been resolved.
    pub fn cached(&self) -> Option<&Path> {
        self.cached.get().map(PathBuf::as_path)
    }

    /// Look for a prebuilt worker: release output first, then debug.
    ///
    /// Only existence is checked.
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = self.cached.get() {
            return Some(path.clone());
        }
        let found = self
            .layout
            .worker_candidates()
            .into_iter()
            .find(|candidate| candidate.exists())?;
        debug!(path = %found.display(), "found worker executable");
        Some(self.cached.get_or_init(|| found).clone())
    }

    /// Build the worker once, bounded by the layout's build timeout.
    ///
    /// A timed-out build is killed.  Nothing is retried.
    pub async fn build(&self) -> Result<(), BuildError> {
        let secs = self.layout.build_timeout_secs;
        info!(
            cmd = %self.build,
            dir = %self.layout.plugin_dir.display(),
            "building publishing worker"
        );

        let mut cmd = Command::new(&self.build.program);
        cmd.args(&self.build.args)
            .current_dir(&self.layout.plugin_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await;

        match result {
            Ok(Ok(output)) if output.status.success() => {
                info!("worker build succeeded");
                Ok(())
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                error!(status = %output.status, "worker build output:\n{}", stderr.trim_end());
                Err(BuildError::Failed {
                    code: output.status.code(),
                    stderr: last_line(&stderr).to_string(),
                })
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BuildError::ToolchainMissing {
                    program: self.build.program.clone(),
                })
            }
            Ok(Err(e)) => Err(BuildError::Io(e.to_string())),
            Err(_) => Err(BuildError::Timeout { secs }),
        }
    }

    /// Resolve the worker, building it at most once when it is missing.
    pub async fn ensure(&self) -> Result<PathBuf, PublishError> {
        if let Some(path) = self.resolve() {
            return Ok(path);
        }

        info!("no prebuilt worker found, building it");
        if let Err(e) = self.build().await {
            error!("worker build failed: {e}");
            return Err(self.unavailable(Some(e)));
        }

        self.resolve().ok_or_else(|| {
            error!(
                worker = %self.layout.worker_name,
                "build succeeded but the worker executable is still missing"
            );
            self.unavailable(None)
        })
    }

    fn unavailable(&self, cause: Option<BuildError>) -> PublishError {
        PublishError::ExecutableUnavailable {
            plugin_dir: self.layout.plugin_dir.clone(),
            cause,
        }
    }
}

/// Last non-empty line of a build log; the summary cargo prints last.
fn last_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("")
}
