// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use wechat_pub_config::{PluginLayout, DEFAULT_BUILD_TIMEOUT_SECS, DEFAULT_WORKER_NAME};

#[derive(Parser, Debug)]
#[command(
    name = "wechat-pub",
    about = "MCP server that publishes Markdown documents to a WeChat Official Account",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Plugin directory holding config.txt and the worker's cargo project
    /// (default: current directory)
    #[arg(long, global = true, env = "WECHAT_PUB_PLUGIN_DIR", value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Directory relative document paths are resolved against
    /// (default: two levels above the plugin directory)
    #[arg(long, global = true, env = "WECHAT_PUB_PROJECT_ROOT", value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Credentials file with `AppID:` and `AppSecret:` lines
    /// (default: <plugin-dir>/config.txt)
    #[arg(long, short = 'c', global = true, env = "WECHAT_PUB_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name of the worker binary under target/{release,debug}
    #[arg(long, global = true, env = "WECHAT_PUB_WORKER", default_value = DEFAULT_WORKER_NAME)]
    pub worker_name: String,

    /// Maximum time allowed for building the worker, in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULT_BUILD_TIMEOUT_SECS)]
    pub build_timeout: u64,

    /// Also append log output to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the publish_to_wechat tool over stdio (default)
    Serve,
    /// Print the effective configuration and exit
    ShowConfig,
    /// Build the publishing worker in the plugin directory and exit
    Build,
    /// Generate shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Subcommand to run; `serve` when none was given.
    pub fn subcommand(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }

    /// Effective plugin layout after applying CLI / environment overrides.
    pub fn layout(&self) -> anyhow::Result<PluginLayout> {
        let plugin_dir = match &self.plugin_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("resolving current directory")?,
        };
        let mut layout = PluginLayout::new(plugin_dir)
            .with_worker_name(self.worker_name.as_str())
            .with_build_timeout_secs(self.build_timeout);
        if let Some(root) = &self.project_root {
            layout = layout.with_project_root(root);
        }
        if let Some(config) = &self.config {
            layout = layout.with_config_file(config);
        }
        Ok(layout)
    }
}

pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "wechat-pub", &mut std::io::stdout());
}
