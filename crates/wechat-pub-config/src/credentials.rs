// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

const APP_ID_KEY: &str = "AppID:";
const APP_SECRET_KEY: &str = "AppSecret:";

/// Platform credentials handed to the publishing worker.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Parse the line-oriented `Key: value` credentials format.
///
/// Only `AppID:` and `AppSecret:` are recognised (case-sensitive); every
/// other line is ignored.  A later occurrence of a key replaces an earlier
/// one.  Returns `None` unless both keys carry a non-empty value.
pub fn parse_credentials(text: &str) -> Option<Credentials> {
    let mut app_id = None;
    let mut app_secret = None;

    for line in text.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix(APP_ID_KEY) {
            app_id = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix(APP_SECRET_KEY) {
            app_secret = Some(value.trim().to_string());
        }
    }

    match (app_id, app_secret) {
        (Some(app_id), Some(app_secret)) if !app_id.is_empty() && !app_secret.is_empty() => {
            Some(Credentials { app_id, app_secret })
        }
        _ => None,
    }
}

/// Credentials loaded once per process from a fixed file.
///
/// A missing or incomplete file is not a startup error: the store simply
/// holds no credentials and every publish attempt reports the file path
/// back to the caller.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    credentials: Option<Credentials>,
}

impl CredentialStore {
    /// Read `path` and keep whatever credentials it yields.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let credentials = read_credentials(&path);
        Self { path, credentials }
    }

    /// Build a store from already-known values (tests, embedding).
    pub fn from_parts(path: impl Into<PathBuf>, credentials: Option<Credentials>) -> Self {
        Self {
            path: path.into(),
            credentials,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

fn read_credentials(path: &Path) -> Option<Credentials> {
    if !path.exists() {
        warn!(path = %path.display(), "credentials file does not exist");
        return None;
    }

    debug!(path = %path.display(), "loading credentials");
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            error!(path = %path.display(), "failed to read credentials file: {e}");
            return None;
        }
    };

    match parse_credentials(&text) {
        Some(creds) => {
            info!(path = %path.display(), "credentials loaded");
            Some(creds)
        }
        None => {
            error!(
                path = %path.display(),
                "credentials file must contain both {APP_ID_KEY} and {APP_SECRET_KEY}"
            );
            None
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
