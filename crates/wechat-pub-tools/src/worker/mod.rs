// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! The external publishing worker.
//!
//! The worker is a separate executable that does the actual platform work
//! (authentication, markdown rendering, draft upload).  This module only
//! knows how to find it, build it when it is missing, run it and read its
//! result:
//!
//! ```text
//! <worker> <document_path> <app_id> <app_secret>
//!   exit 0, stdout {"draft_id": "..."}   → PublishOutcome::Success
//!   exit 0, any other stdout             → PublishOutcome::RawOutput
//!   exit != 0, stderr diagnostic         → PublishOutcome::Failure
//! ```

mod invoker;
mod resolver;

pub use invoker::{interpret_output, run_worker, PublishOutcome};
pub use resolver::{BuildCommand, WorkerResolver};

#[cfg(all(test, unix))]
pub(crate) mod testing {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Write an executable `/bin/sh` script to `path`, creating parents.
    pub fn write_script(path: &Path, body: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }
}
