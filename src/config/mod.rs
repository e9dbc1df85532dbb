// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for splines-build.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. splines-build.toml (cwd, optional)
//! 3. --ini files, in order
//! 4. SPLINES_* env vars
//! 5. --set section/key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! SPLINES_GLOBAL__DRY=true        → global.dry = true
//! SPLINES_NET__MAX_HOPS=3         → net.max_hops = 3
//! SPLINES_BUILD__BUILD_DIR=out    → build.build_dir = "out"
//! ```
//!
//! # Dependencies
//!
//! ```toml
//! [[deps]]
//! name = "eigen"
//! url = "https://example.org/eigen-3.4.0.tar.gz"
//! mirrors = ["https://mirror.example.org/eigen-3.4.0.tar.gz"]
//! file = "third_party/eigen.tar.gz"
//! extract_to = "third_party"
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::core::settings::BuildSettings;
use crate::error::{ConfigError, Result};
use crate::logging::LogConfig;

use loader::ConfigLoader;
use types::{BuildConfig, DependencyConfig, ExtractConfig, GlobalConfig, NetConfig, ToolsConfig};

/// Name of the configuration file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "splines-build.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SPLINES";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// HTTP client options.
    pub net: NetConfig,
    /// Native build options.
    pub build: BuildConfig,
    /// Archive extraction options.
    pub extract: ExtractConfig,
    /// Tool paths.
    pub tools: ToolsConfig,
    /// Third-party archives.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<DependencyConfig>,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use splines_build::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("splines-build.toml")
    ///     .with_env_prefix("SPLINES")
    ///     .set_option("net/max_hops=5")?
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` for a zero hop budget or timeout,
    /// an empty user agent, or an unusable `[[deps]]` entry.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |section: &str, key: &str, message: String| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message,
        };

        if self.net.max_hops == 0 {
            return Err(invalid("net", "max_hops", "must be at least 1".into()));
        }
        if self.net.timeout_secs == 0 {
            return Err(invalid("net", "timeout_secs", "must be at least 1".into()));
        }
        if self.net.user_agent.trim().is_empty() {
            return Err(invalid("net", "user_agent", "must not be empty".into()));
        }

        let mut names = BTreeSet::new();
        for dep in &self.deps {
            if dep.name.trim().is_empty() {
                return Err(invalid("deps", "name", "must not be empty".into()));
            }
            if !names.insert(dep.name.as_str()) {
                return Err(invalid(
                    "deps",
                    "name",
                    format!("duplicate dependency '{}'", dep.name),
                ));
            }
            if dep.url.trim().is_empty() {
                return Err(invalid(
                    "deps",
                    "url",
                    format!("dependency '{}' has no url", dep.name),
                ));
            }
            if dep.file.as_os_str().is_empty() {
                return Err(invalid(
                    "deps",
                    "file",
                    format!("dependency '{}' has no file", dep.name),
                ));
            }
        }
        Ok(())
    }

    /// Looks up a `[[deps]]` entry by name.
    #[must_use]
    pub fn dependency(&self, name: &str) -> Option<&DependencyConfig> {
        self.deps.iter().find(|dep| dep.name == name)
    }

    /// Resolves the `[build]` section into the settings used by the build tools.
    #[must_use]
    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings::from_config(&self.build)
    }

    /// Logging configuration derived from `[global]`.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let log_file = (!self.global.log_file.as_os_str().is_empty())
            .then(|| self.global.log_file.display().to_string());
        LogConfig::builder()
            .with_console_level(self.global.output_log_level)
            .with_file_level(self.global.file_log_level)
            .maybe_with_log_file(log_file)
            .with_file_format(self.global.log_format)
            .build()
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_net_options(&mut options);
        self.format_build_options(&mut options);
        self.format_tools_options(&mut options);
        self.format_deps_options(&mut options);
        options.insert(
            "extract.unknown_entries".into(),
            self.extract.unknown_entries.to_string(),
        );

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("global.dry".into(), self.global.dry.to_string());
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
    }

    fn format_net_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("net.user_agent".into(), self.net.user_agent.clone());
        options.insert("net.max_hops".into(), self.net.max_hops.to_string());
        options.insert("net.timeout_secs".into(), self.net.timeout_secs.to_string());
        options.insert(
            "net.accept_invalid_certs".into(),
            self.net.accept_invalid_certs.to_string(),
        );
    }

    fn format_build_options(&self, options: &mut BTreeMap<String, String>) {
        let build = &self.build;
        options.insert("build.debug".into(), build.debug.to_string());
        options.insert("build.dynamic".into(), build.dynamic.to_string());
        options.insert("build.executable".into(), build.executable.to_string());
        options.insert("build.jobs".into(), build.jobs.to_string());
        options.insert("build.install".into(), build.install.to_string());
        options.insert(
            "build.source_dir".into(),
            build.source_dir.display().to_string(),
        );
        options.insert(
            "build.build_dir".into(),
            build.build_dir.display().to_string(),
        );
        if let Some(platform) = build.platform {
            options.insert("build.platform".into(), platform.to_string());
        }
        if let Some(generator) = &build.generator {
            options.insert("build.generator".into(), generator.clone());
        }
        if let Some(arch) = build.architecture {
            options.insert("build.architecture".into(), arch.to_string());
        }
        if let Some(prefix) = &build.install_prefix {
            options.insert(
                "build.install_prefix".into(),
                prefix.display().to_string(),
            );
        }
        for (key, value) in &build.definitions {
            options.insert(format!("build.definitions.{key}"), value.clone());
        }
    }

    fn format_tools_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("tools.7z".into(), self.tools.sevenz.display().to_string());
        options.insert("tools.cmake".into(), self.tools.cmake.display().to_string());
        options.insert("tools.ctest".into(), self.tools.ctest.display().to_string());
        options.insert("tools.git".into(), self.tools.git.display().to_string());
    }

    fn format_deps_options(&self, options: &mut BTreeMap<String, String>) {
        for dep in &self.deps {
            options.insert(format!("deps.{}.url", dep.name), dep.url.clone());
            options.insert(
                format!("deps.{}.file", dep.name),
                dep.file.display().to_string(),
            );
            if !dep.mirrors.is_empty() {
                options.insert(format!("deps.{}.mirrors", dep.name), dep.mirrors.join(", "));
            }
            if let Some(dir) = &dep.extract_to {
                options.insert(
                    format!("deps.{}.extract_to", dep.name),
                    dir.display().to_string(),
                );
            }
        }
    }
}
