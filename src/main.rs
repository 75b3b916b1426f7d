mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use wechat_pub_config::{CredentialStore, PluginLayout};
use wechat_pub_mcp::{build_mcp_registry, serve_stdio};
use wechat_pub_tools::{PublishTool, WorkerResolver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.subcommand();

    // Completions need neither logging nor a layout.
    if let Commands::Completions { shell } = command {
        cli::print_completions(shell);
        return Ok(());
    }

    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let layout = cli.layout()?;

    match command {
        Commands::Serve => serve(layout).await,
        Commands::ShowConfig => show_config(&layout),
        Commands::Build => build_worker(layout).await,
        Commands::Completions { .. } => Ok(()),
    }
}

async fn serve(layout: PluginLayout) -> anyhow::Result<()> {
    let tool = PublishTool::new(layout);
    info!(
        plugin_dir = %tool.layout().plugin_dir.display(),
        project_root = %tool.layout().project_root.display(),
        configured = tool.credentials().is_configured(),
        "starting wechat-pub MCP server"
    );
    let registry = Arc::new(build_mcp_registry(tool));
    info!(tools = ?registry.names(), "serving on stdio");
    serve_stdio(registry).await?;
    info!("client disconnected, shutting down");
    Ok(())
}

/// Effective configuration as printed by `show-config`.  Never includes
/// the secret.
#[derive(Serialize)]
struct EffectiveConfig<'a> {
    #[serde(flatten)]
    layout: &'a PluginLayout,
    credentials_configured: bool,
    release_worker: &'a Path,
    debug_worker: &'a Path,
}

fn show_config(layout: &PluginLayout) -> anyhow::Result<()> {
    let store = CredentialStore::load(&layout.config_file);
    let [release, debug] = layout.worker_candidates();
    let view = EffectiveConfig {
        layout,
        credentials_configured: store.is_configured(),
        release_worker: &release,
        debug_worker: &debug,
    };
    print!("{}", serde_yaml::to_string(&view).context("serializing configuration")?);
    Ok(())
}

async fn build_worker(layout: PluginLayout) -> anyhow::Result<()> {
    let resolver = WorkerResolver::new(layout);
    resolver
        .build()
        .await
        .with_context(|| format!("running `{}`", resolver.build_command()))?;
    match resolver.resolve() {
        Some(path) => println!("Worker ready: {}", path.display()),
        None => anyhow::bail!("build succeeded but no worker executable was produced"),
    }
    Ok(())
}

/// Logs always go to stderr: stdout carries the MCP protocol.
fn init_logging(verbosity: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();
    Ok(())
}
