// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! The `publish_to_wechat` tool.
//!
//! A call walks through five steps, stopping at the first failure:
//!
//! 1. validate the `document_path` argument
//! 2. check that credentials were loaded at startup
//! 3. resolve the document against the project root and check it exists
//! 4. find the worker executable, building it once if it is missing
//! 5. run the worker and render its outcome
//!
//! Steps 1–4 produce a [`PublishError`]; it is turned into an error text
//! payload only in [`Tool::execute`].

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};
use wechat_pub_config::{CredentialStore, Credentials, PluginLayout};

use crate::error::PublishError;
use crate::tool::{Tool, ToolCall, ToolOutput};
use crate::worker::{run_worker, PublishOutcome, WorkerResolver};

pub const TOOL_NAME: &str = "publish_to_wechat";

pub struct PublishTool {
    layout: PluginLayout,
    credentials: CredentialStore,
    resolver: WorkerResolver,
}

impl PublishTool {
    /// Load credentials from the layout's config file and set up a resolver
    /// with the default build command.
    pub fn new(layout: PluginLayout) -> Self {
        let credentials = CredentialStore::load(&layout.config_file);
        let resolver = WorkerResolver::new(layout.clone());
        Self::from_parts(layout, credentials, resolver)
    }

    pub fn from_parts(
        layout: PluginLayout,
        credentials: CredentialStore,
        resolver: WorkerResolver,
    ) -> Self {
        Self {
            layout,
            credentials,
            resolver,
        }
    }

    pub fn layout(&self) -> &PluginLayout {
        &self.layout
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn resolver(&self) -> &WorkerResolver {
        &self.resolver
    }

    /// Run steps 1–5 and return the resolved document with the outcome.
    pub async fn publish(&self, args: &Value) -> Result<(PathBuf, PublishOutcome), PublishError> {
        let raw = document_path_arg(args)?;
        let credentials = self.authorize()?;
        let document = self.locate_document(raw)?;
        let worker = self.resolver.ensure().await?;
        let outcome = run_worker(&worker, &document, credentials).await;
        Ok((document, outcome))
    }

    fn authorize(&self) -> Result<&Credentials, PublishError> {
        self.credentials
            .credentials()
            .ok_or_else(|| PublishError::ConfigurationMissing {
                config_file: self.credentials.path().to_path_buf(),
            })
    }

    fn locate_document(&self, raw: &str) -> Result<PathBuf, PublishError> {
        let path = self.layout.resolve_document(raw);
        if path.is_file() {
            info!(document = %path.display(), "resolved document");
            Ok(path)
        } else {
            Err(PublishError::DocumentNotFound { path })
        }
    }
}

fn document_path_arg(args: &Value) -> Result<&str, PublishError> {
    match args.get("document_path").and_then(Value::as_str) {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(PublishError::MissingDocumentPath),
    }
}

#[async_trait]
impl Tool for PublishTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Publish a local Markdown document to a WeChat Official Account as a draft. \
         The document path may be relative (to the project root) or absolute. \
         If the document starts with YAML front matter, its title, author, cover \
         and theme settings are used."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "document_path": {
                    "type": "string",
                    "description": "Path of the Markdown document to publish (relative or absolute)"
                }
            },
            "required": ["document_path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        info!(call_id = %call.id, "publish_to_wechat called");
        match self.publish(&call.args).await {
            Ok((document, outcome)) => {
                if let PublishOutcome::Success { draft_id } = &outcome {
                    info!(%draft_id, "published draft");
                }
                outcome.into_output(&call.id, &document)
            }
            Err(e) => {
                warn!(call_id = %call.id, "publish rejected: {e}");
                ToolOutput::err(&call.id, format!("Error: {e}"))
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::worker::testing::write_script;
    use crate::worker::BuildCommand;

    /// A plugin dir nested two levels below a project root, with a document
    /// at `<root>/posts/hello.md`.
    struct Fixture {
        _root: tempfile::TempDir,
        layout: PluginLayout,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let plugin_dir = root.path().join("plugins").join("wechat_pub");
            std::fs::create_dir_all(&plugin_dir).unwrap();
            std::fs::create_dir_all(root.path().join("posts")).unwrap();
            std::fs::write(root.path().join("posts/hello.md"), "# Hello\n").unwrap();
            let layout = PluginLayout::new(&plugin_dir);
            Self { _root: root, layout }
        }

        fn plugin_dir(&self) -> &Path {
            &self.layout.plugin_dir
        }

        fn worker(&self, body: &str) {
            write_script(&self.layout.release_worker(), body);
        }

        fn tool(&self, creds: Option<Credentials>) -> PublishTool {
            self.tool_with_build(creds, "echo build >> build.log; exit 1")
        }

        fn tool_with_build(&self, creds: Option<Credentials>, build: &str) -> PublishTool {
            let store = CredentialStore::from_parts(&self.layout.config_file, creds);
            let resolver = WorkerResolver::new(self.layout.clone()).with_build_command(BuildCommand {
                program: "sh".into(),
                args: vec!["-c".into(), build.into()],
            });
            PublishTool::from_parts(self.layout.clone(), store, resolver)
        }

        fn build_runs(&self) -> usize {
            std::fs::read_to_string(self.plugin_dir().join("build.log"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }

        fn worker_marker(&self) -> bool {
            self.plugin_dir().join("worker.ran").exists()
        }
    }

    fn creds() -> Option<Credentials> {
        Some(Credentials { app_id: "wx-id".into(), app_secret: "wx-secret".into() })
    }

    fn call(args: Value) -> ToolCall {
        ToolCall { id: "t1".into(), name: TOOL_NAME.into(), args }
    }

    #[test]
    fn schema_requires_document_path() {
        let fx = Fixture::new();
        let schema = fx.tool(creds()).parameters_schema();
        assert_eq!(schema["required"], json!(["document_path"]));
        assert_eq!(schema["properties"]["document_path"]["type"], "string");
    }

    #[test]
    fn description_mentions_front_matter() {
        let fx = Fixture::new();
        assert!(fx.tool(creds()).description().contains("front matter"));
    }

    #[tokio::test]
    async fn missing_argument_is_rejected() {
        let fx = Fixture::new();
        let tool = fx.tool(creds());
        for args in [json!({}), json!({"document_path": ""}), json!({"document_path": 3})] {
            let out = tool.execute(&call(args)).await;
            assert!(out.is_error);
            assert!(out.content.contains("document_path is required"));
        }
    }

    #[tokio::test]
    async fn missing_credentials_stop_before_any_subprocess() {
        let fx = Fixture::new();
        fx.worker("touch \"$(dirname \"$0\")/../../worker.ran\"");
        let out = fx.tool(None).execute(&call(json!({"document_path": "posts/hello.md"}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("not configured"));
        assert!(out.content.contains("config.txt"));
        assert!(!fx.worker_marker());
        assert_eq!(fx.build_runs(), 0);
    }

    #[tokio::test]
    async fn missing_document_names_resolved_path() {
        let fx = Fixture::new();
        let out = fx.tool(creds()).execute(&call(json!({"document_path": "posts/nope.md"}))).await;
        assert!(out.is_error);
        let expected = fx.layout.project_root.join("posts/nope.md");
        assert!(out.content.contains(&expected.display().to_string()));
        assert_eq!(fx.build_runs(), 0);
    }

    #[tokio::test]
    async fn failed_build_is_attempted_once() {
        let fx = Fixture::new();
        let out = fx.tool(creds()).execute(&call(json!({"document_path": "posts/hello.md"}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("cargo build --release"));
        assert_eq!(fx.build_runs(), 1);
    }

    #[tokio::test]
    async fn draft_id_is_reported() {
        let fx = Fixture::new();
        fx.worker(r#"echo '{"success": true, "draft_id": "abc123"}'"#);
        let out = fx.tool(creds()).execute(&call(json!({"document_path": "posts/hello.md"}))).await;
        assert!(!out.is_error, "{}", out.content);
        assert!(out.content.contains("abc123"));
        assert!(out.content.contains("hello.md"));
        assert_eq!(fx.build_runs(), 0);
    }

    #[tokio::test]
    async fn absolute_document_path_is_used_as_is() {
        let fx = Fixture::new();
        fx.worker(r#"printf '%s' "$1""#);
        let doc = fx.layout.project_root.join("posts/hello.md");
        let out = fx
            .tool(creds())
            .execute(&call(json!({"document_path": doc.display().to_string()})))
            .await;
        assert_eq!(out.content, format!("Publish completed: {}", doc.display()));
    }

    #[tokio::test]
    async fn plain_text_result_is_passed_through() {
        let fx = Fixture::new();
        fx.worker("echo 'plain text result'");
        let out = fx.tool(creds()).execute(&call(json!({"document_path": "posts/hello.md"}))).await;
        assert!(!out.is_error);
        assert!(out.content.contains("plain text result"));
    }

    #[tokio::test]
    async fn worker_failure_is_reported() {
        let fx = Fixture::new();
        fx.worker("echo 'auth failed' >&2\nexit 1");
        let out = fx.tool(creds()).execute(&call(json!({"document_path": "posts/hello.md"}))).await;
        assert!(out.is_error);
        assert!(out.content.contains("auth failed"));
    }

    #[tokio::test]
    async fn worker_is_built_on_demand_then_cached() {
        let fx = Fixture::new();
        let build = "echo build >> build.log\n\
                     mkdir -p target/release\n\
                     printf '#!/bin/sh\\necho built-ok\\n' > target/release/wechat_client\n\
                     chmod +x target/release/wechat_client";
        let tool = fx.tool_with_build(creds(), build);
        let args = json!({"document_path": "posts/hello.md"});

        let first = tool.execute(&call(args.clone())).await;
        assert_eq!(first.content, "Publish completed: built-ok");
        let second = tool.execute(&call(args)).await;
        assert_eq!(second.content, "Publish completed: built-ok");

        assert_eq!(fx.build_runs(), 1);
        assert_eq!(tool.resolver().cached(), Some(fx.layout.release_worker().as_path()));
    }
}
