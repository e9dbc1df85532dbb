// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Downloader tool for HTTP file downloads.
//!
//! ```text
//! URLs --> Fetcher (resolve redirects, GET) --> local file
//! Features: mirror fallback, skip existing, force re-download, cancel
//! ```

use std::path::PathBuf;

use crate::error::{NetworkError, Result};
use anyhow::Context;
use tracing::{debug, info, warn};

use super::{BoxFuture, Tool, ToolContext};
use crate::net::{DownloadTarget, FetchOutcome, Fetcher, ProgressDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloaderOperation {
    #[default]
    Download,
    Clean,
}

#[derive(Debug, Clone)]
pub struct DownloaderTool {
    urls: Vec<String>,
    output_file: Option<PathBuf>,
    force: bool,
    progress: ProgressDisplay,
    operation: DownloaderOperation,
}

impl Default for DownloaderTool {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloaderTool {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            urls: Vec::new(),
            output_file: None,
            force: false,
            progress: ProgressDisplay::Bar,
            operation: DownloaderOperation::Download,
        }
    }

    /// Add a URL to download from. Multiple URLs will be tried in order.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    #[must_use]
    pub fn urls(mut self, urls: Vec<String>) -> Self {
        self.urls = urls;
        self
    }

    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Deletes an existing file before downloading.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub const fn progress(mut self, style: ProgressDisplay) -> Self {
        self.progress = style;
        self
    }

    #[must_use]
    pub const fn download_op(mut self) -> Self {
        self.operation = DownloaderOperation::Download;
        self
    }

    #[must_use]
    pub const fn clean_op(mut self) -> Self {
        self.operation = DownloaderOperation::Clean;
        self
    }

    async fn execute_download(&self, ctx: &ToolContext) -> Result<()> {
        let output_file = self
            .output_file
            .as_ref()
            .context("no output file specified")?;

        if ctx.is_cancelled() {
            anyhow::bail!("download cancelled");
        }

        if self.urls.is_empty() {
            anyhow::bail!("no URLs provided for download");
        }

        if ctx.is_dry_run() {
            info!(
                url = %self.urls[0],
                file = %output_file.display(),
                force = self.force,
                "[dry-run] would download"
            );
            return Ok(());
        }

        if self.force && output_file.exists() {
            tokio::fs::remove_file(output_file)
                .await
                .with_context(|| format!("failed to delete {}", output_file.display()))?;
            debug!(file = %output_file.display(), "deleted for re-download");
        }

        let fetcher = Fetcher::new(&ctx.config().net.to_settings())?
            .progress(self.progress)
            .with_cancel_token(ctx.cancel_token().clone());

        let mut last_error = None;
        for (idx, url) in self.urls.iter().enumerate() {
            if ctx.is_cancelled() {
                anyhow::bail!("download cancelled");
            }

            debug!(
                url = %url,
                attempt = idx + 1,
                total = self.urls.len(),
                "attempting download"
            );

            match fetcher
                .fetch(&DownloadTarget::new(url.as_str(), output_file))
                .await
            {
                Ok(FetchOutcome::AlreadyExists | FetchOutcome::Downloaded { .. }) => return Ok(()),
                Err(e) => {
                    if matches!(e.as_network(), Some(NetworkError::Interrupted)) {
                        return Err(e.into());
                    }
                    warn!(url = %url, error = %e, "download attempt failed");
                    last_error = Some(e);
                }
            }
        }

        last_error.map_or_else(
            || Err(anyhow::anyhow!("no URLs provided for download")),
            |error| {
                Err(anyhow::Error::from(error)).with_context(|| {
                    format!("all download URLs failed for {}", output_file.display())
                })
            },
        )
    }

    async fn execute_clean(&self, ctx: &ToolContext) -> Result<()> {
        let output_file = self
            .output_file
            .as_ref()
            .context("no output file specified")?;

        if ctx.is_dry_run() {
            info!(file = %output_file.display(), "[dry-run] would delete");
            return Ok(());
        }

        if output_file.exists() {
            tokio::fs::remove_file(output_file)
                .await
                .with_context(|| format!("failed to delete {}", output_file.display()))?;
            info!(file = %output_file.display(), "file deleted");
        } else {
            debug!(file = %output_file.display(), "file does not exist, nothing to clean");
        }

        Ok(())
    }
}

impl Tool for DownloaderTool {
    fn name(&self) -> &'static str {
        "downloader"
    }

    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.operation {
                DownloaderOperation::Download => self.execute_download(ctx).await,
                DownloaderOperation::Clean => self.execute_clean(ctx).await,
            }
        })
    }
}
