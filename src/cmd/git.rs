// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `submodules` command.

use tokio_util::sync::CancellationToken;

use crate::cli::git::SubmodulesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::tools::Tool;
use crate::tools::git::GitTool;

use super::tool_context;

/// Syncs, updates or resets the submodules of a repository.
///
/// # Errors
///
/// Returns an error if a git step that must succeed fails.
pub async fn run_submodules_command(
    args: &SubmodulesArgs,
    config: &Config,
    token: CancellationToken,
) -> Result<()> {
    let ctx = tool_context(config, token);
    let mut tool = GitTool::new();
    if let Some(path) = &args.path {
        tool = tool.path(path);
    }

    if args.reset {
        return tool.reset_op().run(&ctx).await;
    }

    tool.clone().submodule_sync_op().run(&ctx).await?;
    if args.last {
        tool.pull_latest_op().run(&ctx).await?;
    }
    Ok(())
}
