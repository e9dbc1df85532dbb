// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration section types.
//!
//! ```text
//! Config: GlobalConfig, NetConfig, BuildConfig, ExtractConfig, ToolsConfig
//! deps:   [[deps]] name/url/mirrors/file/extract_to
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::platform::{Architecture, Platform};
use crate::error::ConfigError;
use crate::logging::{LogFormat, LogLevel};
use crate::net::NetSettings;

/// `CMake` build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

impl BuildType {
    #[must_use]
    pub const fn from_debug(debug: bool) -> Self {
        if debug { Self::Debug } else { Self::Release }
    }
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "Debug"),
            Self::Release => write!(f, "Release"),
        }
    }
}

impl std::str::FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            _ => Err(ConfigError::InvalidValue {
                section: "build".to_string(),
                key: "build_type".to_string(),
                message: format!("expected 'Debug' or 'Release', got '{s}'"),
            }),
        }
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log what would happen without touching the filesystem or network.
    pub dry: bool,
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; empty disables file logging.
    pub log_file: PathBuf,
    /// Log file line format.
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            dry: false,
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::new(),
            log_format: LogFormat::Text,
        }
    }
}

/// HTTP settings for the redirect resolver and fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetConfig {
    /// Client label sent as `User-Agent`.
    pub user_agent: String,
    /// Maximum number of requests while following a redirect chain.
    pub max_hops: u32,
    /// Connect and read timeout for a single hop, in seconds.
    pub timeout_secs: u64,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for NetConfig {
    fn default() -> Self {
        let settings = NetSettings::default();
        Self {
            user_agent: settings.user_agent,
            max_hops: settings.max_hops,
            timeout_secs: settings.timeout.as_secs(),
            accept_invalid_certs: settings.accept_invalid_certs,
        }
    }
}

impl NetConfig {
    /// Converts to the settings consumed by the network layer.
    #[must_use]
    pub fn to_settings(&self) -> NetSettings {
        NetSettings {
            user_agent: self.user_agent.clone(),
            max_hops: self.max_hops,
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

/// Native library build options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Build with debug information (`CMAKE_BUILD_TYPE=Debug`).
    pub debug: bool,
    /// Build shared libraries.
    pub dynamic: bool,
    /// Build the test executables.
    pub executable: bool,
    /// Parallel build jobs; 0 uses every available core.
    pub jobs: usize,
    /// Platform override; detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// `CMake` generator override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Target architecture (Windows generators only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Architecture>,
    /// Source directory containing the top-level `CMakeLists.txt`.
    pub source_dir: PathBuf,
    /// Out-of-tree build directory.
    pub build_dir: PathBuf,
    /// Install prefix; `CMake`'s default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_prefix: Option<PathBuf>,
    /// Run the install target after building.
    pub install: bool,
    /// Extra `-D` definitions.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            debug: false,
            dynamic: false,
            executable: false,
            jobs: 0,
            platform: None,
            generator: None,
            architecture: None,
            source_dir: PathBuf::from("."),
            build_dir: PathBuf::from("build"),
            install_prefix: None,
            install: true,
            definitions: BTreeMap::new(),
        }
    }
}

/// What to do with tar entries that are neither files, directories nor symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownEntryPolicy {
    /// Log a warning and continue.
    #[default]
    Warn,
    /// Abort the extraction.
    Fail,
}

impl std::fmt::Display for UnknownEntryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Archive extraction options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    pub unknown_entries: UnknownEntryPolicy,
}

/// External executables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// `CMake` executable; resolved through PATH when empty.
    pub cmake: PathBuf,
    /// `CTest` executable; resolved through PATH when empty.
    pub ctest: PathBuf,
    /// Git executable; resolved through PATH when empty.
    pub git: PathBuf,
    /// 7-Zip executable used for `.zip` and `.7z` archives.
    #[serde(rename = "7z")]
    pub sevenz: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cmake: PathBuf::new(),
            ctest: PathBuf::new(),
            git: PathBuf::new(),
            sevenz: PathBuf::from("7z"),
        }
    }
}

/// A third-party archive fetched and unpacked before the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    /// Name used on the command line.
    pub name: String,
    /// Primary download URL.
    pub url: String,
    /// Fallback URLs, tried in order after `url`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mirrors: Vec<String>,
    /// Where the archive is stored.
    pub file: PathBuf,
    /// Directory the archive is unpacked into; not unpacked when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_to: Option<PathBuf>,
}

impl DependencyConfig {
    /// All candidate URLs, primary first.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        std::iter::once(self.url.clone())
            .chain(self.mirrors.iter().cloned())
            .collect()
    }
}
