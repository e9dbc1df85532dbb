// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `build`, `test` and `clean` commands.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::build::BuildArgs;
use crate::config::Config;
use crate::error::Result;
use crate::tools::Tool;
use crate::tools::cmake::CmakeTool;

use super::tool_context;

/// Configures, builds and (unless disabled) installs.
///
/// # Errors
///
/// Returns an error if any cmake step fails or is interrupted.
pub async fn run_build_command(
    args: &BuildArgs,
    config: &Config,
    token: CancellationToken,
) -> Result<()> {
    let settings = config.build_settings();
    let ctx = tool_context(config, token);
    info!(
        platform = %settings.platform,
        build_type = %settings.build_type,
        jobs = settings.jobs,
        "building"
    );

    let cmake = CmakeTool::new(settings.clone());
    cmake
        .clone()
        .reconfigure(args.reconfigure)
        .configure_op()
        .run(&ctx)
        .await?;
    cmake.clone().build_op().run(&ctx).await?;
    if settings.install {
        cmake.install_op().run(&ctx).await?;
    }

    info!("build completed successfully");
    Ok(())
}

/// Runs ctest in the build directory.
///
/// # Errors
///
/// Returns an error if ctest fails.
pub async fn run_test_command(config: &Config, token: CancellationToken) -> Result<()> {
    let ctx = tool_context(config, token);
    CmakeTool::new(config.build_settings())
        .test_op()
        .run(&ctx)
        .await
}

/// Removes the build directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be removed.
pub async fn run_clean_command(config: &Config, token: CancellationToken) -> Result<()> {
    let ctx = tool_context(config, token);
    CmakeTool::new(config.build_settings())
        .clean_op()
        .run(&ctx)
        .await
}
