// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tool abstractions for command execution.
//!
//! ```text
//! cmd --> ToolContext --> Tool::run
//!   Downloader (Fetcher), Extractor (tar / 7z), CMake, Git
//! ToolContext: config + cancel token + dry-run flag
//! ```
//!
//! All tools support graceful cancellation via `CancellationToken`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;

pub mod cmake;
pub mod downloader;
pub mod extractor;
pub mod git;

pub use futures_util::future::BoxFuture;

/// Context provided to tools during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// Cancellation token for cooperative cancellation.
    cancel_token: CancellationToken,

    /// When true, tools log what they would do without making changes.
    dry_run: bool,

    config: Arc<Config>,
}

impl ToolContext {
    #[must_use]
    pub const fn new(config: Arc<Config>, cancel_token: CancellationToken, dry_run: bool) -> Self {
        Self {
            cancel_token,
            dry_run,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Arc<Config> {
        &self.config
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Checks if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// A single build step (download, extract, cmake, git).
///
/// # Implementation Notes
///
/// - Tools should use `ProcessBuilder::run_with_cancellation()` for process execution
/// - Tools should respect `ctx.is_dry_run()` and only log actions without executing
pub trait Tool: Send + Sync {
    /// Returns the name of this tool (e.g., "git", "cmake").
    fn name(&self) -> &str;

    /// Executes the tool's operation.
    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>>;
}

#[cfg(test)]
mod test_utils;
