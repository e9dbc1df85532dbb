// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build switches resolved once at startup.
//!
//! ```text
//! BuildConfig ──from_config()──> BuildSettings { platform, build_type, jobs, ... }
//!                                      │
//!                                      v
//!                            CmakeTool (configure/build/test)
//! ```

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::config::types::{BuildConfig, BuildType};
use crate::core::platform::{Architecture, Platform};

/// Immutable build switches passed to every build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub platform: Platform,
    pub build_type: BuildType,
    /// Build shared libraries.
    pub shared: bool,
    /// Build the test executables.
    pub tests: bool,
    /// Parallel jobs, always at least 1.
    pub jobs: usize,
    pub generator: Option<String>,
    pub architecture: Option<Architecture>,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub install_prefix: Option<PathBuf>,
    pub install: bool,
    pub definitions: BTreeMap<String, String>,
}

impl BuildSettings {
    /// Resolves platform, generator and job count from the `[build]` section.
    #[must_use]
    pub fn from_config(config: &BuildConfig) -> Self {
        let platform = Platform::resolve(config.platform);
        let jobs = if config.jobs == 0 {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            config.jobs
        };

        Self {
            platform,
            build_type: BuildType::from_debug(config.debug),
            shared: config.dynamic,
            tests: config.executable,
            jobs,
            generator: config
                .generator
                .clone()
                .or_else(|| platform.default_generator().map(str::to_string)),
            architecture: config.architecture,
            source_dir: config.source_dir.clone(),
            build_dir: config.build_dir.clone(),
            install_prefix: config.install_prefix.clone(),
            install: config.install,
            definitions: config.definitions.clone(),
        }
    }

    /// `-D` definitions for the configure step, in command-line order.
    #[must_use]
    pub fn cmake_definitions(&self) -> Vec<String> {
        let on_off = |flag: bool| if flag { "ON" } else { "OFF" };
        let mut defs = vec![
            format!("-DUTILS_ENABLE_TESTS:VAR={}", on_off(self.tests)),
            format!("-DUTILS_BUILD_SHARED:VAR={}", on_off(self.shared)),
            format!("-DCMAKE_BUILD_TYPE:VAR={}", self.build_type),
        ];
        if let Some(prefix) = &self.install_prefix {
            defs.push(format!("-DCMAKE_INSTALL_PREFIX:PATH={}", prefix.display()));
        }
        defs.extend(
            self.definitions
                .iter()
                .map(|(key, value)| format!("-D{key}={value}")),
        );
        defs
    }
}
