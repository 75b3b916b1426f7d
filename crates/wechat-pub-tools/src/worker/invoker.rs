// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::path::Path;
use std::process::Stdio;

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, error, info};
use wechat_pub_config::Credentials;

use crate::tool::ToolOutput;

/// What a single worker run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Worker exited 0 and reported a draft id.
    Success { draft_id: String },
    /// Worker exited 0 but stdout was not a JSON object with a `draft_id`.
    RawOutput { text: String },
    /// Worker exited non-zero, or could not be run at all.
    Failure { message: String },
}

impl PublishOutcome {
    /// Render the outcome as the text payload returned to the client.
    pub fn into_output(self, call_id: &str, document: &Path) -> ToolOutput {
        match self {
            PublishOutcome::Success { draft_id } => ToolOutput::ok(
                call_id,
                format!(
                    "✅ Article published successfully!\n\n\
                     Draft ID: {draft_id}\n\n\
                     You can review and manage this draft in the WeChat Official Account admin console.\n\
                     Document: {}\n",
                    document.display()
                ),
            ),
            PublishOutcome::RawOutput { text } => {
                ToolOutput::ok(call_id, format!("Publish completed: {text}"))
            }
            PublishOutcome::Failure { message } => {
                ToolOutput::err(call_id, format!("Publish failed: {message}"))
            }
        }
    }
}

/// Classify a finished worker run from its exit status and raw streams.
///
/// Both streams are decoded lossily.  On success stdout is trimmed and
/// parsed as JSON; anything that is not an object with a usable
/// `draft_id` degrades to [`PublishOutcome::RawOutput`].
pub fn interpret_output(success: bool, stdout: &[u8], stderr: &[u8]) -> PublishOutcome {
    if !success {
        return PublishOutcome::Failure {
            message: String::from_utf8_lossy(stderr).trim().to_string(),
        };
    }

    let text = String::from_utf8_lossy(stdout).trim().to_string();
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => match map.get("draft_id").and_then(draft_id_of) {
            Some(draft_id) => PublishOutcome::Success { draft_id },
            None => PublishOutcome::RawOutput { text },
        },
        _ => PublishOutcome::RawOutput { text },
    }
}

fn draft_id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Run the worker as `<executable> <document> <app_id> <app_secret>` and
/// wait for it to finish.
///
/// There is no timeout and no cancellation: once spawned, the worker runs
/// to completion even if the caller stops waiting.
pub async fn run_worker(
    executable: &Path,
    document: &Path,
    credentials: &Credentials,
) -> PublishOutcome {
    info!(
        worker = %executable.display(),
        document = %document.display(),
        "running publishing worker"
    );

    let result = Command::new(executable)
        .arg(document)
        .arg(&credentials.app_id)
        .arg(&credentials.app_secret)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false)
        .output()
        .await;

    match result {
        Ok(output) => {
            debug!(status = %output.status, "worker exited");
            let mut outcome =
                interpret_output(output.status.success(), &output.stdout, &output.stderr);
            if let PublishOutcome::Failure { message } = &mut outcome {
                if message.is_empty() {
                    *message = format!("worker {}", output.status);
                }
                error!("worker failed: {message}");
            }
            outcome
        }
        Err(e) => {
            error!(worker = %executable.display(), "could not run worker: {e}");
            PublishOutcome::Failure {
                message: format!("could not run {}: {e}", executable.display()),
            }
        }
    }
}
