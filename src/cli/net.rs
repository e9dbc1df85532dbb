// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the network and archive commands.
//!
//! ```text
//! resolve URL                 → prints the final URL of the redirect chain
//! fetch URL DEST [--force]    → resolve, then download into DEST
//! extract ARCHIVE DEST        → unpack .tar.gz/.tgz/.tar natively, .zip/.7z via 7z
//! deps [NAME...]              → fetch and extract the [[deps]] entries
//! ```

use clap::Args;
use std::path::PathBuf;

/// Options of the HTTP client, mapped onto `[net]`.
#[derive(Debug, Clone, Default, Args)]
pub struct NetOptions {
    /// Maximum number of requests while following redirects.
    #[arg(long = "max-hops", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_hops: Option<u32>,

    /// Connect/read timeout per request, in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// User-Agent header sent on every request.
    #[arg(long = "user-agent", value_name = "AGENT")]
    pub user_agent: Option<String>,

    /// Accepts invalid TLS certificates.
    #[arg(long)]
    pub insecure: bool,
}

impl NetOptions {
    /// Converts the flags to `net/...` configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();

        if let Some(hops) = self.max_hops {
            overrides.push(format!("net/max_hops={hops}"));
        }
        if let Some(timeout) = self.timeout {
            overrides.push(format!("net/timeout_secs={timeout}"));
        }
        if let Some(ref agent) = self.user_agent {
            overrides.push(format!("net/user_agent={agent}"));
        }
        if self.insecure {
            overrides.push("net/accept_invalid_certs=true".to_string());
        }

        overrides
    }
}

/// Arguments for the `resolve` command.
#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// URL to resolve.
    #[arg(value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub net: NetOptions,
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// URL to download.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Destination file.
    #[arg(value_name = "DEST")]
    pub destination: PathBuf,

    /// Deletes an existing destination and downloads again.
    #[arg(short = 'f', long)]
    pub force: bool,

    #[command(flatten)]
    pub net: NetOptions,
}

/// Arguments for the `extract` command.
#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Archive to unpack.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory.
    #[arg(value_name = "DEST")]
    pub destination: PathBuf,

    /// Extracts again even if a previous extraction finished.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Fails on tar entries that cannot be extracted instead of skipping them.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `deps` command.
#[derive(Debug, Clone, Default, Args)]
pub struct DepsArgs {
    /// Dependencies to process; all configured ones when empty.
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Re-downloads archives even if they exist.
    #[arg(short = 'g', long)]
    pub redownload: bool,

    /// Re-extracts archives even if they were extracted before.
    #[arg(short = 'e', long)]
    pub reextract: bool,

    #[command(flatten)]
    pub net: NetOptions,
}
