// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `CMake` tool for configure/build/install/test operations.
//!
//! ```text
//! CmakeTool(BuildSettings)
//! Operations: Configure | Build | Install | Test | Clean
//!
//! configure: cmake -S src -B build [-G gen] [-A arch] -D... --loglevel=STATUS
//! build:     cmake --build build --config T [--parallel N]   (cmake >= 3.12, not Windows)
//! install:   cmake --build build --config T --target install
//! test:      ctest --output-on-failure -C T                   (cwd = build)
//! ```

pub mod version;

use std::path::Path;

use crate::error::Result;
use anyhow::Context;
use tokio::fs;
use tracing::{debug, info};

use self::version::CmakeVersion;
use super::{BoxFuture, Tool, ToolContext};
use crate::core::platform::Platform;
use crate::core::process::builder::ProcessBuilder;
use crate::core::settings::BuildSettings;

/// `CMake` operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CmakeOperation {
    /// Configure the build directory.
    #[default]
    Configure,
    /// Build all targets.
    Build,
    /// Build the `install` target.
    Install,
    /// Run `ctest` in the build directory.
    Test,
    /// Remove the build directory.
    Clean,
}

/// Arguments of the configure step.
#[must_use]
pub fn configure_args(settings: &BuildSettings) -> Vec<String> {
    let mut args = vec![
        "-S".to_string(),
        settings.source_dir.display().to_string(),
        "-B".to_string(),
        settings.build_dir.display().to_string(),
    ];

    if let Some(generator) = &settings.generator {
        args.push("-G".to_string());
        args.push(generator.clone());
    }

    if settings.platform.uses_architecture()
        && let Some(architecture) = settings.architecture
    {
        args.push("-A".to_string());
        args.push(architecture.cmake_name().to_string());
    }

    args.extend(settings.cmake_definitions());
    args.push("--loglevel=STATUS".to_string());
    args
}

/// Arguments of the build step; `--parallel` needs a known cmake version.
#[must_use]
pub fn build_args(settings: &BuildSettings, cmake: Option<CmakeVersion>) -> Vec<String> {
    let mut args = vec![
        "--build".to_string(),
        settings.build_dir.display().to_string(),
        "--config".to_string(),
        settings.build_type.to_string(),
    ];

    if cmake.is_some_and(|v| settings.platform.supports_parallel(v.major_minor())) {
        args.push("--parallel".to_string());
        args.push(settings.jobs.to_string());
    }
    args
}

/// Arguments of the install step.
#[must_use]
pub fn install_args(settings: &BuildSettings) -> Vec<String> {
    vec![
        "--build".to_string(),
        settings.build_dir.display().to_string(),
        "--config".to_string(),
        settings.build_type.to_string(),
        "--target".to_string(),
        "install".to_string(),
    ]
}

/// Arguments of `ctest`, run from the build directory.
#[must_use]
pub fn test_args(settings: &BuildSettings) -> Vec<String> {
    vec![
        "--output-on-failure".to_string(),
        "-C".to_string(),
        settings.build_type.to_string(),
    ]
}

/// `CMake` tool bound to one set of build switches.
#[derive(Debug, Clone)]
pub struct CmakeTool {
    settings: BuildSettings,
    cmake_version: Option<CmakeVersion>,
    reconfigure: bool,
    operation: CmakeOperation,
}

impl CmakeTool {
    #[must_use]
    pub const fn new(settings: BuildSettings) -> Self {
        Self {
            settings,
            cmake_version: None,
            reconfigure: false,
            operation: CmakeOperation::Configure,
        }
    }

    /// Uses a known cmake version instead of probing `cmake --version`.
    #[must_use]
    pub const fn cmake_version(mut self, version: CmakeVersion) -> Self {
        self.cmake_version = Some(version);
        self
    }

    /// Drops the existing cache before configuring.
    #[must_use]
    pub const fn reconfigure(mut self, reconfigure: bool) -> Self {
        self.reconfigure = reconfigure;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    #[must_use]
    pub const fn configure_op(mut self) -> Self {
        self.operation = CmakeOperation::Configure;
        self
    }

    #[must_use]
    pub const fn build_op(mut self) -> Self {
        self.operation = CmakeOperation::Build;
        self
    }

    #[must_use]
    pub const fn install_op(mut self) -> Self {
        self.operation = CmakeOperation::Install;
        self
    }

    #[must_use]
    pub const fn test_op(mut self) -> Self {
        self.operation = CmakeOperation::Test;
        self
    }

    #[must_use]
    pub const fn clean_op(mut self) -> Self {
        self.operation = CmakeOperation::Clean;
        self
    }

    fn cmake_builder(ctx: &ToolContext) -> Result<ProcessBuilder> {
        ProcessBuilder::configured(&ctx.config().tools.cmake, "cmake")
            .context("cmake executable not found")
    }

    fn ctest_builder(ctx: &ToolContext) -> Result<ProcessBuilder> {
        ProcessBuilder::configured(&ctx.config().tools.ctest, "ctest")
            .context("ctest executable not found")
    }

    async fn run_step(ctx: &ToolContext, builder: ProcessBuilder, step: &str) -> Result<()> {
        debug!(command = %builder.command_line(), "running {step}");

        let output = builder
            .run_with_cancellation(ctx.cancel_token().clone())
            .await
            .with_context(|| format!("failed to run {step}"))?;

        if output.is_interrupted() {
            anyhow::bail!("{step} was interrupted");
        }

        info!("{step} completed successfully");
        Ok(())
    }

    async fn do_configure(&self, ctx: &ToolContext) -> Result<()> {
        let args = configure_args(&self.settings);

        if ctx.is_dry_run() {
            info!(
                reconfigure = self.reconfigure,
                args = %args.join(" "),
                "[dry-run] would configure cmake"
            );
            return Ok(());
        }

        if self.reconfigure {
            remove_cache(&self.settings.build_dir).await?;
        }

        let builder = Self::cmake_builder(ctx)?.args(&args);
        Self::run_step(ctx, builder, "cmake configure").await
    }

    async fn detect_version(&self, ctx: &ToolContext) -> Result<Option<CmakeVersion>> {
        if self.cmake_version.is_some() {
            return Ok(self.cmake_version);
        }
        if self.settings.platform == Platform::Windows {
            return Ok(None);
        }
        let version = version::detect(Self::cmake_builder(ctx)?, ctx.cancel_token().clone()).await?;
        Ok(Some(version))
    }

    async fn do_build(&self, ctx: &ToolContext) -> Result<()> {
        if ctx.is_dry_run() {
            let args = build_args(&self.settings, self.cmake_version);
            info!(args = %args.join(" "), "[dry-run] would build with cmake");
            return Ok(());
        }

        let version = self.detect_version(ctx).await?;
        let args = build_args(&self.settings, version);
        let builder = Self::cmake_builder(ctx)?.args(&args);
        Self::run_step(ctx, builder, "cmake build").await
    }

    async fn do_install(&self, ctx: &ToolContext) -> Result<()> {
        let args = install_args(&self.settings);

        if ctx.is_dry_run() {
            info!(
                prefix = ?self.settings.install_prefix,
                args = %args.join(" "),
                "[dry-run] would install with cmake"
            );
            return Ok(());
        }

        let builder = Self::cmake_builder(ctx)?.args(&args);
        Self::run_step(ctx, builder, "cmake install").await
    }

    async fn do_test(&self, ctx: &ToolContext) -> Result<()> {
        let args = test_args(&self.settings);
        let build = &self.settings.build_dir;

        if ctx.is_dry_run() {
            info!(
                build = %build.display(),
                args = %args.join(" "),
                "[dry-run] would run ctest"
            );
            return Ok(());
        }

        if !build.is_dir() {
            anyhow::bail!(
                "build directory {} does not exist; run the build first",
                build.display()
            );
        }

        let builder = Self::ctest_builder(ctx)?.args(&args).cwd(build);
        Self::run_step(ctx, builder, "ctest").await
    }

    async fn do_clean(&self, ctx: &ToolContext) -> Result<()> {
        let build = &self.settings.build_dir;

        if ctx.is_dry_run() {
            info!(build = %build.display(), "[dry-run] would clean build directory");
            return Ok(());
        }

        if build.exists() {
            fs::remove_dir_all(build)
                .await
                .with_context(|| format!("failed to clean build directory: {}", build.display()))?;
        }

        info!(build = %build.display(), "build directory cleaned");
        Ok(())
    }
}

async fn remove_cache(build_dir: &Path) -> Result<()> {
    let cache = build_dir.join("CMakeCache.txt");
    if cache.exists() {
        fs::remove_file(&cache)
            .await
            .with_context(|| format!("failed to remove {}", cache.display()))?;
    }
    let files = build_dir.join("CMakeFiles");
    if files.exists() {
        fs::remove_dir_all(&files)
            .await
            .with_context(|| format!("failed to remove {}", files.display()))?;
    }
    debug!(build = %build_dir.display(), "cmake cache removed");
    Ok(())
}

impl Tool for CmakeTool {
    fn name(&self) -> &'static str {
        "cmake"
    }

    fn run<'a>(&'a self, ctx: &'a ToolContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.operation {
                CmakeOperation::Configure => self.do_configure(ctx).await,
                CmakeOperation::Build => self.do_build(ctx).await,
                CmakeOperation::Install => self.do_install(ctx).await,
                CmakeOperation::Test => self.do_test(ctx).await,
                CmakeOperation::Clean => self.do_clean(ctx).await,
            }
        })
    }
}
