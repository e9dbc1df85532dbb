// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!          SplinesError (~16 bytes)
//!                     |
//!   +-------+-------+-------+-------+
//!   |       |       |       |       |
//!   v       v       v       v       v
//!  Net   Archive   Cfg    Proc     Io
//!  Box     Box     Box     Box     Box
//!
//! Sub-errors (unboxed internally):
//!   Network UnexpectedStatus, TooManyRedirects, MissingLocation, HttpError, Reqwest
//!   Archive UnsupportedFormat, UnsupportedEntry, UnsafePath
//!   Config  InvalidValue
//!   Process SpawnFailed, NonZeroExit, Timeout
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SplinesError`].
pub type SplinesResult<T> = std::result::Result<T, SplinesError>;

/// Top-level library error type.
///
/// All sub-errors are boxed to keep this enum at ~16 bytes on the stack.
#[derive(Debug, Error)]
pub enum SplinesError {
    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] Box<NetworkError>),

    /// Archive extraction failed.
    #[error("archive error: {0}")]
    Archive(#[from] Box<ArchiveError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

impl SplinesError {
    /// Returns the network error if this is one.
    #[must_use]
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self {
            Self::Network(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Returns the archive error if this is one.
    #[must_use]
    pub fn as_archive(&self) -> Option<&ArchiveError> {
        match self {
            Self::Archive(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for SplinesError {
                fn from(err: $error) -> Self {
                    SplinesError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    NetworkError => Network,
    ArchiveError => Archive,
    ConfigError => Config,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Network Errors ---

/// Network operation errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Download failed.
    #[error("download failed: {url} - {message}")]
    DownloadFailed { url: String, message: String },

    /// Download was interrupted by user or signal.
    #[error("download interrupted")]
    Interrupted,

    /// HTTP error response while fetching a resolved URL.
    #[error("http error {status}: {url}")]
    HttpError { status: u16, url: String },

    /// A hop answered with neither a success nor a redirection status.
    #[error("unexpected response {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The hop budget ran out before a success response.
    #[error("too many http redirects resolving {url} (limit {max_hops})")]
    TooManyRedirects { url: String, max_hops: u32 },

    /// A redirection response carried no usable `Location` header.
    #[error("redirect {status} from {url} has no Location header")]
    MissingLocation { status: u16, url: String },

    /// Error from reqwest library.
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Connect or read timeout on a single hop.
    #[error("connection timeout: {url}")]
    Timeout { url: String },

}

// --- Archive Errors ---

/// Archive extraction errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive type could not be determined or is not handled.
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// A tar entry of a kind that is not extracted, under the `fail` policy.
    #[error("unsupported tar entry '{path}' (type {kind})")]
    UnsupportedEntry { path: String, kind: String },

    /// An entry would be written outside the destination directory.
    #[error("refusing to extract '{path}' outside the destination")]
    UnsafePath { path: String },

    /// I/O error while reading the archive or writing an entry.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Process timed out.
    #[error("process '{command}' timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },
}
