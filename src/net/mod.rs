// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP redirect resolution and file fetching.
//!
//! ```text
//! NetSettings { user_agent, max_hops, timeout, accept_invalid_certs }
//!        |
//!        v
//!   build_client()   redirects disabled, per-hop connect/read timeout
//!        |
//!        v
//! RedirectResolver::resolve(url)
//!   RESOLVING --2xx--> DONE (url)
//!      |  ^
//!      3xx (Location, Set-Cookie)
//!      |
//!      +--other--> UnexpectedStatus
//!      +--budget--> TooManyRedirects
//!        |
//!        v
//! Fetcher::fetch(DownloadTarget)
//!   exists? --> AlreadyExists (no request)
//!   GET resolved url --> temp file --> rename --> Downloaded
//!
//! Progress display
//!   Bar     [=====>     ] 50MB/100MB
//!   Spinner * 50MB @ 5MB/s
//!   Silent  (none)
//! ```

mod fetcher;
mod resolver;


use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

use crate::error::{NetworkError, SplinesResult};

pub use fetcher::{DownloadTarget, FetchOutcome, Fetcher};
pub use resolver::{RedirectResolver, Resolution, ResolutionState};

/// Default hop budget for one resolution.
pub const DEFAULT_MAX_HOPS: u32 = 10;

/// Default connect and read timeout for one hop.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by the resolver and the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetSettings {
    /// Client label sent as `User-Agent`.
    pub user_agent: String,
    /// Maximum number of requests while following one redirect chain.
    pub max_hops: u32,
    /// Connect and read timeout, applied to each hop separately.
    pub timeout: Duration,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("splines-build/{}", env!("CARGO_PKG_VERSION")),
            max_hops: DEFAULT_MAX_HOPS,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// Builds an HTTP client that never follows redirects on its own.
///
/// # Errors
///
/// Returns a `NetworkError::Reqwest` if the TLS backend cannot be initialized.
pub fn build_client(settings: &NetSettings) -> SplinesResult<Client> {
    if settings.accept_invalid_certs {
        warn!("TLS certificate verification is disabled");
    }

    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(settings.timeout)
        .read_timeout(settings.timeout)
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
        .map_err(|e| NetworkError::Reqwest(e).into())
}

/// Maps a request failure, reporting timeouts against the hop's URL.
pub(crate) fn request_error(err: reqwest::Error, url: &str) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
    } else {
        NetworkError::Reqwest(err)
    }
}

/// Pre-validated progress bar style for known file sizes.
fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} @ {binary_bytes_per_sec} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

/// Pre-validated spinner style for unknown file sizes.
fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bytes} @ {binary_bytes_per_sec}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        })
        .clone()
}

/// Progress display style for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressDisplay {
    /// Show a visual progress bar with speed and ETA
    #[default]
    Bar,
    /// Show a spinner (when total size is unknown)
    Spinner,
    /// No visual progress (silent mode)
    Silent,
}

impl ProgressDisplay {
    /// Creates the indicator for a body of `total_size` bytes (0 = unknown).
    fn create(self, total_size: u64) -> Option<ProgressBar> {
        match self {
            Self::Silent => None,
            Self::Bar if total_size > 0 => {
                let pb = ProgressBar::new(total_size);
                pb.set_style(bar_style());
                Some(pb)
            }
            Self::Bar | Self::Spinner => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(spinner_style());
                Some(pb)
            }
        }
    }
}
