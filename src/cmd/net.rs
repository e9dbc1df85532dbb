// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `resolve`, `fetch` and `extract` commands.

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::net::{ExtractArgs, FetchArgs, ResolveArgs};
use crate::config::Config;
use crate::config::types::UnknownEntryPolicy;
use crate::error::{NetworkError, Result, SplinesError};
use crate::net::RedirectResolver;
use crate::tools::downloader::DownloaderTool;
use crate::tools::extractor::ExtractorTool;
use crate::tools::Tool;

use super::tool_context;

/// Resolves a URL and returns its final location.
///
/// # Errors
///
/// Returns the resolver's error, or `Interrupted` once `token` is cancelled.
pub async fn resolve_url(config: &Config, url: &str, token: &CancellationToken) -> Result<String> {
    let resolver = RedirectResolver::new(&config.net.to_settings())?;
    tokio::select! {
        biased;
        () = token.cancelled() => Err(SplinesError::from(NetworkError::Interrupted).into()),
        resolved = resolver.resolve(url) => {
            Ok(resolved.with_context(|| format!("failed to resolve {url}"))?)
        }
    }
}

/// Prints the final URL of the redirect chain starting at `args.url`.
///
/// # Errors
///
/// Returns an error if resolution fails or is interrupted.
pub async fn run_resolve_command(
    args: &ResolveArgs,
    config: &Config,
    token: CancellationToken,
) -> Result<()> {
    if config.global.dry {
        info!(url = %args.url, "[dry-run] would resolve");
        return Ok(());
    }

    let resolved = resolve_url(config, &args.url, &token).await?;
    println!("{resolved}");
    Ok(())
}

/// Downloads `args.url` into `args.destination`.
///
/// # Errors
///
/// Returns an error if the download fails.
pub async fn run_fetch_command(
    args: &FetchArgs,
    config: &Config,
    token: CancellationToken,
) -> Result<()> {
    let ctx = tool_context(config, token);
    DownloaderTool::new()
        .url(&args.url)
        .file(&args.destination)
        .force(args.force)
        .run(&ctx)
        .await
}

/// Unpacks `args.archive` into `args.destination`.
///
/// # Errors
///
/// Returns an error if extraction fails.
pub async fn run_extract_command(
    args: &ExtractArgs,
    config: &Config,
    token: CancellationToken,
) -> Result<()> {
    let ctx = tool_context(config, token);
    let mut tool = ExtractorTool::new()
        .archive(&args.archive)
        .output(&args.destination)
        .force(args.force);
    if args.strict {
        tool = tool.unknown_entries(UnknownEntryPolicy::Fail);
    }
    tool.run(&ctx).await
}
