// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Downloads a resolved URL into a local file.
//!
//! The body is streamed into a temporary file next to the destination and
//! renamed over it once complete, so the destination either holds the whole
//! body or does not exist.

use futures_util::StreamExt;
use indicatif::ProgressBar;
use reqwest::header::{ACCEPT, COOKIE};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{NetSettings, ProgressDisplay, RedirectResolver, request_error};
use crate::error::{NetworkError, SplinesResult};

/// What to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub source: String,
    pub destination: PathBuf,
}

impl DownloadTarget {
    #[must_use]
    pub fn new(source: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Result of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The body of `url` was written to the destination.
    Downloaded { url: String, bytes: u64 },
    /// The destination was already present; nothing was requested.
    AlreadyExists,
}

/// Resolves and downloads [`DownloadTarget`]s.
#[derive(Debug, Clone)]
pub struct Fetcher {
    resolver: RedirectResolver,
    progress: ProgressDisplay,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Creates a fetcher with its own resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &NetSettings) -> SplinesResult<Self> {
        Ok(Self::from_resolver(RedirectResolver::new(settings)?))
    }

    #[must_use]
    pub fn from_resolver(resolver: RedirectResolver) -> Self {
        Self {
            resolver,
            progress: ProgressDisplay::default(),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub const fn progress(mut self, style: ProgressDisplay) -> Self {
        self.progress = style;
        self
    }

    /// Disable progress display (silent mode).
    #[must_use]
    pub const fn silent(mut self) -> Self {
        self.progress = ProgressDisplay::Silent;
        self
    }

    /// Aborts the transfer with `Interrupted` once `token` is cancelled.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub const fn resolver(&self) -> &RedirectResolver {
        &self.resolver
    }

    /// Makes sure `target.destination` holds the resource's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Resolution fails (see [`RedirectResolver::resolve`]).
    /// - The final GET answers with a non-success status (`HttpError`).
    /// - The destination directory or temporary file cannot be written.
    /// - The transfer is cancelled (`Interrupted`).
    ///
    /// On any error the destination is left absent.
    pub async fn fetch(&self, target: &DownloadTarget) -> SplinesResult<FetchOutcome> {
        let destination = &target.destination;

        if tokio::fs::try_exists(destination).await? {
            info!(
                path = %destination.display(),
                "file already exists, skipping download"
            );
            return Ok(FetchOutcome::AlreadyExists);
        }

        if self.cancel.is_cancelled() {
            return Err(NetworkError::Interrupted.into());
        }

        let resolution = self.resolver.resolve_detailed(&target.source).await?;
        if resolution.url != target.source {
            debug!(
                from = %target.source,
                to = %resolution.url,
                hops = resolution.hops,
                "resolved"
            );
        }

        let url = resolution.url;
        let mut request = self.resolver.client().get(&url).header(ACCEPT, "*/*");
        if let Some(cookie) = &resolution.cookie {
            request = request.header(COOKIE, cookie.as_str());
        }
        let response = request.send().await.map_err(|e| request_error(e, &url))?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpError {
                status: response.status().as_u16(),
                url,
            }
            .into());
        }

        let failed = |message: String| NetworkError::DownloadFailed {
            url: url.clone(),
            message,
        };

        let dir = parent_dir(destination);
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            failed(format!(
                "failed to create parent directory {}: {e}",
                dir.display()
            ))
        })?;

        // Removed on drop unless persisted.
        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".splines-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| failed(format!("failed to create temporary file in {}: {e}", dir.display())))?
            .into_parts();

        let progress_bar = self.progress.create(response.content_length().unwrap_or(0));
        let written = self
            .stream_body(
                response,
                &url,
                tokio::fs::File::from_std(file),
                temp_path,
                destination,
                progress_bar.as_ref(),
            )
            .await;

        if let Some(pb) = progress_bar {
            settle_progress(&pb, &written);
        }
        let bytes = written?;

        info!(
            url = %url,
            path = %destination.display(),
            bytes,
            "download completed"
        );
        Ok(FetchOutcome::Downloaded { url, bytes })
    }

    /// Streams `response` into `temp_path` and renames it over `destination`.
    ///
    /// The temporary file is deleted when dropped on any error path.
    async fn stream_body(
        &self,
        response: reqwest::Response,
        url: &str,
        mut file: tokio::fs::File,
        temp_path: TempPath,
        destination: &Path,
        progress_bar: Option<&ProgressBar>,
    ) -> SplinesResult<u64> {
        let failed = |message: String| NetworkError::DownloadFailed {
            url: url.to_string(),
            message,
        };

        let mut stream = response.bytes_stream();
        let mut bytes: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(NetworkError::Interrupted.into());
                }
                next = stream.next() => next,
            };
            let Some(chunk) = next else { break };

            let chunk = chunk.map_err(|e| request_error(e, url))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| failed(format!("failed to write to {}: {e}", temp_path.display())))?;
            bytes += chunk.len() as u64;

            if let Some(pb) = progress_bar {
                pb.inc(chunk.len() as u64);
            }
        }

        file.flush()
            .await
            .map_err(|e| failed(format!("failed to flush {}: {e}", temp_path.display())))?;
        drop(file);

        temp_path.persist(destination).map_err(|e| {
            failed(format!(
                "failed to move download into {}: {}",
                destination.display(),
                e.error
            ))
        })?;
        Ok(bytes)
    }
}

/// Clears the bar after a complete transfer and leaves it on screen, tagged
/// with the reason, otherwise.
pub(super) fn settle_progress(pb: &ProgressBar, written: &SplinesResult<u64>) {
    match written {
        Ok(_) => pb.finish_and_clear(),
        Err(e) if matches!(e.as_network(), Some(NetworkError::Interrupted)) => {
            pb.abandon_with_message("interrupted");
        }
        Err(_) => pb.abandon_with_message("failed"),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
