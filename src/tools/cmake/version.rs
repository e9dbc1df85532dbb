// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `cmake --version` probing.

use std::fmt;

use anyhow::Context;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::process::builder::ProcessBuilder;
use crate::error::Result;

/// A `major.minor.patch` cmake version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CmakeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl CmakeVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    #[must_use]
    pub const fn major_minor(self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

impl fmt::Display for CmakeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parses the last `x.y.z` triple in `cmake --version` output.
///
/// # Errors
///
/// Returns an error if no version triple is present.
pub fn parse_version(output: &str) -> Result<CmakeVersion> {
    let regex = Regex::new(r"(\d+)\.(\d+)\.(\d+)").context("failed to compile version regex")?;

    let captures = regex
        .captures_iter(output)
        .last()
        .with_context(|| format!("no version found in cmake output: {}", output.trim()))?;

    let number = |index: usize| -> Result<u32> {
        captures
            .get(index)
            .context("version capture missing")?
            .as_str()
            .parse()
            .context("version component out of range")
    };

    Ok(CmakeVersion::new(number(1)?, number(2)?, number(3)?))
}

/// Runs `<cmake> --version` and parses the result.
///
/// # Errors
///
/// Returns an error if cmake cannot be run or prints no version.
pub async fn detect(cmake: ProcessBuilder, token: CancellationToken) -> Result<CmakeVersion> {
    let output = cmake
        .arg("--version")
        .capture_stdout()
        .run_with_cancellation(token)
        .await
        .context("failed to run cmake --version")?;

    if output.is_interrupted() {
        anyhow::bail!("cmake --version was interrupted");
    }

    let version = parse_version(output.stdout())?;
    debug!(version = %version, "detected cmake");
    Ok(version)
}
