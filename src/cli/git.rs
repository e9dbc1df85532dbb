// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Submodule command arguments.
//!
//! ```text
//! submodules           → init/update/sync, recursively
//! submodules --last    → same, then pull the latest commit everywhere
//! submodules --reset   → discard local changes, back to recorded commits
//! ```

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `submodules` command.
#[derive(Debug, Clone, Default, Args)]
pub struct SubmodulesArgs {
    /// Updates every submodule to its latest upstream commit after syncing.
    #[arg(long, conflicts_with = "reset")]
    pub last: bool,

    /// Hard-resets the repository and every submodule.
    #[arg(long)]
    pub reset: bool,

    /// Repository root; the current directory when omitted.
    #[arg(short = 'C', long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,
}
