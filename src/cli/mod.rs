// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for splines-build using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! splines-build [global options] <command>
//! version | options [--json] | inis
//! resolve URL | fetch URL DEST | extract ARCHIVE DEST | deps [NAME...]
//! build | test | clean
//! submodules [--last | --reset]
//! ```

pub mod build;
pub mod git;
pub mod global;
pub mod net;


use crate::cli::build::{BuildArgs, OptionsArgs};
use crate::cli::git::SubmodulesArgs;
use crate::cli::global::GlobalOptions;
use crate::cli::net::{DepsArgs, ExtractArgs, FetchArgs, ResolveArgs};
use clap::{Parser, Subcommand};

/// Splines Build Helper
///
/// Fetches third-party archives and drives the `CMake` build of the
/// Splines library.
#[derive(Debug, Parser)]
#[command(
    name = "splines-build",
    author,
    version,
    about = "Splines Build Helper",
    long_about = "splines-build Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Fetches third-party archives (following HTTP redirect chains)\n\
                  and drives the CMake build of the Splines library.",
    after_help = "CONFIGURATION:\n\n\
                  splines-build reads `splines-build.toml` from the current directory\n\
                  if present, then every --ini file in order, then SPLINES_* environment\n\
                  variables (e.g. SPLINES_NET__MAX_HOPS=5), then --set options and\n\
                  command-line flags. Use --no-default-inis to skip the local file."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their values.
    Options(OptionsArgs),

    /// Lists the configuration files that were loaded.
    Inis,

    /// Follows the redirect chain of a URL and prints the final URL.
    Resolve(ResolveArgs),

    /// Downloads a URL into a file, following redirects.
    Fetch(FetchArgs),

    /// Unpacks an archive.
    Extract(ExtractArgs),

    /// Downloads and unpacks the configured dependencies.
    Deps(DepsArgs),

    /// Configures, builds and installs the library.
    Build(BuildArgs),

    /// Runs the test suite with ctest.
    Test,

    /// Removes the build directory.
    Clean,

    /// Initialises, updates or resets git submodules.
    Submodules(SubmodulesArgs),
}

impl Command {
    /// Configuration overrides implied by the command's own flags.
    #[must_use]
    pub fn config_overrides(&self) -> Vec<String> {
        match self {
            Self::Resolve(args) => args.net.to_config_overrides(),
            Self::Fetch(args) => args.net.to_config_overrides(),
            Self::Deps(args) => args.net.to_config_overrides(),
            Self::Build(args) => args.to_config_overrides(),
            Self::Version
            | Self::Options(_)
            | Self::Inis
            | Self::Extract(_)
            | Self::Test
            | Self::Clean
            | Self::Submodules(_) => Vec::new(),
        }
    }
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
