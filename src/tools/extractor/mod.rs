// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Archive extraction tool.
//!
//! ```text
//! .tar.gz | .tgz | .tar --> tar::unpack (native, spawn_blocking) --> output_dir
//! .zip              --> 7z x -aos (keep existing files)          --> output_dir
//! .7z               --> 7z x -aoa                                --> output_dir
//!
//! output_dir/.<archive>.extracted marks a finished extraction
//! ```

pub mod tar;

use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, Result, SplinesError};
use anyhow::Context;
use tokio::fs;
use tracing::{debug, info};

use super::{BoxFuture, Tool, ToolContext};
use crate::config::types::UnknownEntryPolicy;
use crate::core::process::builder::ProcessBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    SevenZip,
    Zip,
    TarGz,
    Tar,
}

impl ArchiveFormat {
    /// Detects archive format from file extension (case-insensitive).
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;

        let ends_with_ci = |s: &str, suffix: &str| {
            s.len() >= suffix.len()
                && s.is_char_boundary(s.len() - suffix.len())
                && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
        };

        if ends_with_ci(filename, ".tar.gz") || ends_with_ci(filename, ".tgz") {
            return Some(Self::TarGz);
        }

        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("7z") {
            Some(Self::SevenZip)
        } else if ext.eq_ignore_ascii_case("zip") {
            Some(Self::Zip)
        } else if ext.eq_ignore_ascii_case("tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorOperation {
    #[default]
    Extract,
    Clean,
}

#[derive(Debug, Clone)]
pub struct ExtractorTool {
    archive: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    format: Option<ArchiveFormat>,
    policy: Option<UnknownEntryPolicy>,
    force: bool,
    operation: ExtractorOperation,
}

impl ExtractorTool {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            archive: None,
            output_dir: None,
            format: None,
            policy: None,
            force: false,
            operation: ExtractorOperation::Extract,
        }
    }

    #[must_use]
    pub fn archive(mut self, path: impl AsRef<Path>) -> Self {
        self.archive = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Explicitly sets the archive format (auto-detection used if not specified).
    #[must_use]
    pub const fn format(mut self, format: ArchiveFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Overrides `extract.unknown_entries` for this extraction.
    #[must_use]
    pub const fn unknown_entries(mut self, policy: UnknownEntryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Extracts again even if a previous extraction finished.
    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub const fn extract_op(mut self) -> Self {
        self.operation = ExtractorOperation::Extract;
        self
    }

    #[must_use]
    pub const fn clean_op(mut self) -> Self {
        self.operation = ExtractorOperation::Clean;
        self
    }

    fn archive_required(&self) -> Result<&Path> {
        self.archive
            .as_deref()
            .context("ExtractorTool: archive path is required")
    }

    fn output_dir_required(&self) -> Result<&Path> {
        self.output_dir
            .as_deref()
            .context("ExtractorTool: output directory is required")
    }

    fn detect_format(&self) -> Result<ArchiveFormat> {
        if let Some(format) = self.format {
            return Ok(format);
        }

        let archive = self.archive_required()?;
        ArchiveFormat::from_extension(archive).ok_or_else(|| {
            SplinesError::from(ArchiveError::UnsupportedFormat(format!(
                "{} (supported: .tar.gz, .tgz, .tar, .zip, .7z)",
                archive.display()
            )))
            .into()
        })
    }

    /// Marker written into the output directory after a finished extraction.
    fn marker_path(archive: &Path, output_dir: &Path) -> PathBuf {
        let name = archive
            .file_name()
            .map_or_else(|| "archive".into(), |n| n.to_string_lossy());
        output_dir.join(format!(".{name}.extracted"))
    }

    async fn do_extract(&self, ctx: &ToolContext) -> Result<()> {
        let archive = self.archive_required()?;
        let output_dir = self.output_dir_required()?;
        let format = self.detect_format()?;
        let marker = Self::marker_path(archive, output_dir);

        if marker.exists() && !self.force {
            info!(
                archive = %archive.display(),
                output = %output_dir.display(),
                "archive already extracted, skipping"
            );
            return Ok(());
        }

        if ctx.is_dry_run() {
            info!(
                archive = %archive.display(),
                output = %output_dir.display(),
                format = ?format,
                force = self.force,
                "[dry-run] would extract archive"
            );
            return Ok(());
        }

        if ctx.is_cancelled() {
            anyhow::bail!("extraction cancelled");
        }

        fs::create_dir_all(output_dir).await.with_context(|| {
            format!(
                "failed to create output directory: {}",
                output_dir.display()
            )
        })?;

        debug!(
            archive = %archive.display(),
            output = %output_dir.display(),
            format = ?format,
            "extracting archive"
        );

        match format {
            ArchiveFormat::TarGz => self.extract_tar(ctx, archive, output_dir, true).await?,
            ArchiveFormat::Tar => self.extract_tar(ctx, archive, output_dir, false).await?,
            ArchiveFormat::Zip => Self::extract_with_7z(ctx, archive, output_dir, "-aos").await?,
            ArchiveFormat::SevenZip => {
                Self::extract_with_7z(ctx, archive, output_dir, "-aoa").await?;
            }
        }

        fs::write(&marker, b"")
            .await
            .with_context(|| format!("failed to write {}", marker.display()))?;

        info!(
            archive = %archive.display(),
            output = %output_dir.display(),
            "archive extracted"
        );
        Ok(())
    }

    async fn extract_tar(
        &self,
        ctx: &ToolContext,
        archive: &Path,
        output_dir: &Path,
        gzip: bool,
    ) -> Result<()> {
        let policy = self
            .policy
            .unwrap_or(ctx.config().extract.unknown_entries);
        let archive_owned = archive.to_path_buf();
        let output_owned = output_dir.to_path_buf();

        let summary = tokio::task::spawn_blocking(move || {
            tar::unpack(&archive_owned, gzip, &output_owned, policy)
        })
        .await
        .context("tar extraction task failed")??;

        debug!(
            files = summary.files,
            directories = summary.directories,
            symlinks = summary.symlinks,
            skipped = summary.skipped,
            "tar unpacked"
        );
        Ok(())
    }

    async fn extract_with_7z(
        ctx: &ToolContext,
        archive: &Path,
        output_dir: &Path,
        overwrite: &str,
    ) -> Result<()> {
        let output = ProcessBuilder::new(&ctx.config().tools.sevenz)
            .name("7z")
            .arg("x")
            .arg(overwrite)
            .arg("-bd")
            .arg("-bb0")
            .arg(format!("-o{}", output_dir.display()))
            .arg(archive)
            .run_with_cancellation(ctx.cancel_token().clone())
            .await
            .context("failed to run 7z extraction")?;

        if output.is_interrupted() {
            anyhow::bail!("archive extraction was interrupted");
        }

        Ok(())
    }

    async fn do_clean(&self, ctx: &ToolContext) -> Result<()> {
        let output_dir = self.output_dir_required()?;

        if ctx.is_dry_run() {
            info!(
                output = %output_dir.display(),
                "[dry-run] would clean output directory"
            );
            return Ok(());
        }

        if output_dir.exists() {
            fs::remove_dir_all(output_dir).await.with_context(|| {
                format!("failed to clean output directory: {}", output_dir.display())
            })?;
            info!(output = %output_dir.display(), "output directory cleaned");
        } else {
            debug!(output = %output_dir.display(), "output directory does not exist");
        }

        Ok(())
    }
}

impl Default for ExtractorTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ExtractorTool {
    fn name(&self) -> &'static str {
        "extractor"
    }

    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.operation {
                ExtractorOperation::Extract => self.do_extract(ctx).await,
                ExtractorOperation::Clean => self.do_clean(ctx).await,
            }
        })
    }
}
