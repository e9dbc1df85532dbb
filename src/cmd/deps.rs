// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `deps` command: fetch and unpack the `[[deps]]` archives.

use anyhow::bail;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::net::DepsArgs;
use crate::config::Config;
use crate::config::types::DependencyConfig;
use crate::error::Result;
use crate::tools::downloader::DownloaderTool;
use crate::tools::extractor::ExtractorTool;
use crate::tools::{Tool, ToolContext};

use super::tool_context;

/// Picks the dependencies named on the command line, or all of them.
///
/// # Errors
///
/// Returns an error naming the first unknown dependency.
pub fn select_dependencies<'a>(
    config: &'a Config,
    names: &[String],
) -> Result<Vec<&'a DependencyConfig>> {
    if names.is_empty() {
        return Ok(config.deps.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            config.dependency(name).ok_or_else(|| {
                let known: Vec<&str> = config.deps.iter().map(|d| d.name.as_str()).collect();
                anyhow::anyhow!(
                    "unknown dependency '{name}' (configured: {})",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            })
        })
        .collect()
}

async fn process_dependency(
    ctx: &ToolContext,
    dep: &DependencyConfig,
    args: &DepsArgs,
) -> Result<()> {
    info!(dependency = %dep.name, "processing dependency");

    DownloaderTool::new()
        .urls(dep.urls())
        .file(&dep.file)
        .force(args.redownload)
        .run(ctx)
        .await?;

    if let Some(extract_to) = &dep.extract_to {
        ExtractorTool::new()
            .archive(&dep.file)
            .output(extract_to)
            .force(args.reextract || args.redownload)
            .run(ctx)
            .await?;
    }
    Ok(())
}

/// Main handler for the deps command.
///
/// # Errors
///
/// Returns an error if a name is unknown or a download/extraction fails.
pub async fn run_deps_command(
    args: &DepsArgs,
    config: &Config,
    token: CancellationToken,
) -> Result<()> {
    let deps = select_dependencies(config, &args.names)?;
    if deps.is_empty() {
        warn!("no dependencies configured");
        return Ok(());
    }

    let ctx = tool_context(config, token);
    for dep in deps {
        if ctx.is_cancelled() {
            bail!("dependency processing cancelled");
        }
        process_dependency(&ctx, dep, args)
            .await
            .map_err(|e| e.context(format!("dependency '{}' failed", dep.name)))?;
    }

    info!("dependencies ready");
    Ok(())
}
