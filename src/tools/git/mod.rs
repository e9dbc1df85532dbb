// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git tool for submodule maintenance.
//!
//! ```text
//! GitTool
//! Operations: SubmoduleSync | PullLatest | Reset
//!
//! sync:  submodule init/update/sync, then the same inside every submodule
//!        (failures are logged and the next step runs)
//! pull:  submodule foreach --recursive git pull
//! reset: reset --hard, update --init, sync, foreach reset/clean,
//!        update --checkout (stops at the first failure)
//! ```
//!
//! Commands go through `ProcessBuilder::run_with_cancellation()` so output
//! streams to the log and Ctrl+C stops the running step.

use std::path::{Path, PathBuf};

use crate::error::Result;
use anyhow::Context;
use tracing::{debug, info, warn};

use super::{BoxFuture, Tool, ToolContext};
use crate::core::process::builder::{ProcessBuilder, ProcessFlags};

/// Git operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GitOperation {
    /// Initialise, update and sync submodules recursively.
    #[default]
    SubmoduleSync,
    /// Pull the latest commit in every submodule.
    PullLatest,
    /// Discard local changes and check submodules out at the recorded commits.
    Reset,
}

impl GitOperation {
    /// Argument lists passed to `git`, in execution order.
    #[must_use]
    pub fn commands(self) -> Vec<Vec<&'static str>> {
        match self {
            Self::SubmoduleSync => vec![
                vec!["submodule", "init"],
                vec!["submodule", "update"],
                vec!["submodule", "sync"],
                vec!["submodule", "foreach", "--recursive", "git submodule init"],
                vec!["submodule", "foreach", "--recursive", "git submodule update"],
                vec!["submodule", "foreach", "--recursive", "git submodule sync"],
            ],
            Self::PullLatest => vec![vec!["submodule", "foreach", "--recursive", "git pull"]],
            Self::Reset => vec![
                vec!["reset", "--hard"],
                vec!["submodule", "update", "--init", "--recursive"],
                vec!["submodule", "sync", "--recursive"],
                vec!["submodule", "foreach", "--recursive", "git reset --hard"],
                vec!["submodule", "foreach", "--recursive", "git clean -d -x -f"],
                vec!["submodule", "update", "--checkout", "--recursive"],
            ],
        }
    }

    /// Whether a failing step aborts the operation.
    #[must_use]
    pub const fn stops_on_failure(self) -> bool {
        match self {
            Self::SubmoduleSync | Self::PullLatest => false,
            Self::Reset => true,
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::SubmoduleSync => "submodule sync",
            Self::PullLatest => "submodule pull",
            Self::Reset => "submodule reset",
        }
    }
}

/// Git tool for submodule operations on one working tree.
#[derive(Debug, Clone)]
pub struct GitTool {
    path: Option<PathBuf>,
    operation: GitOperation,
}

impl GitTool {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            path: None,
            operation: GitOperation::SubmoduleSync,
        }
    }

    /// Working tree to run in; the current directory when unset.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub const fn submodule_sync_op(mut self) -> Self {
        self.operation = GitOperation::SubmoduleSync;
        self
    }

    #[must_use]
    pub const fn pull_latest_op(mut self) -> Self {
        self.operation = GitOperation::PullLatest;
        self
    }

    #[must_use]
    pub const fn reset_op(mut self) -> Self {
        self.operation = GitOperation::Reset;
        self
    }

    fn working_dir(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new("."))
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<()> {
        let path = self.working_dir();
        let operation = self.operation;
        let commands = operation.commands();

        if ctx.is_dry_run() {
            for args in &commands {
                info!(
                    path = %path.display(),
                    command = %format!("git {}", args.join(" ")),
                    "[dry-run] would run"
                );
            }
            return Ok(());
        }

        for args in commands {
            if ctx.is_cancelled() {
                anyhow::bail!("{} cancelled", operation.describe());
            }

            let mut builder = ProcessBuilder::configured(&ctx.config().tools.git, "git")
                .context("git executable not found")?
                .args(&args)
                .cwd(path);
            if !operation.stops_on_failure() {
                builder = builder.flag(ProcessFlags::ALLOW_FAILURE);
            }

            debug!(path = %path.display(), command = %builder.command_line(), "running git");

            let output = builder
                .run_with_cancellation(ctx.cancel_token().clone())
                .await
                .with_context(|| {
                    format!("failed to run 'git {}' in {}", args.join(" "), path.display())
                })?;

            if output.is_interrupted() {
                anyhow::bail!("{} was interrupted", operation.describe());
            }

            if !output.success() {
                warn!(
                    path = %path.display(),
                    command = %format!("git {}", args.join(" ")),
                    code = output.exit_code(),
                    "git step failed, continuing"
                );
            }
        }

        info!(path = %path.display(), "{} completed", operation.describe());
        Ok(())
    }
}

impl Default for GitTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for GitTool {
    fn name(&self) -> &'static str {
        "git"
    }

    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.execute(ctx))
    }
}
