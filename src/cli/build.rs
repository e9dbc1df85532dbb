// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build command arguments.
//!
//! ```text
//! build [--debug] [--dynamic] [--tests] [-j N] [--no-install] [--reconfigure]
//!   → configure, build, then install unless --no-install
//! ```

use clap::Args;

/// Arguments for the `build` command.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Builds the Debug configuration instead of Release.
    #[arg(long)]
    pub debug: bool,

    /// Builds shared libraries.
    #[arg(long)]
    pub dynamic: bool,

    /// Builds the test executables.
    #[arg(long)]
    pub tests: bool,

    /// Parallel jobs; 0 uses every core.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Skips the install step.
    #[arg(long = "no-install")]
    pub no_install: bool,

    /// Drops the cmake cache before configuring.
    #[arg(long)]
    pub reconfigure: bool,
}

impl BuildArgs {
    /// Converts the flags to `build/...` configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();

        if self.debug {
            overrides.push("build/debug=true".to_string());
        }
        if self.dynamic {
            overrides.push("build/dynamic=true".to_string());
        }
        if self.tests {
            overrides.push("build/executable=true".to_string());
        }
        if let Some(jobs) = self.jobs {
            overrides.push(format!("build/jobs={jobs}"));
        }
        if self.no_install {
            overrides.push("build/install=false".to_string());
        }

        overrides
    }
}

/// Arguments for the `options` command.
#[derive(Debug, Clone, Default, Args)]
pub struct OptionsArgs {
    /// Prints the merged configuration as JSON.
    #[arg(long)]
    pub json: bool,
}
