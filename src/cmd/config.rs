// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Config-related commands for splines-build.

use anyhow::Context;

use crate::cli::global::GlobalOptions;
use crate::config::loader::ConfigLoader;
use crate::config::{Config, ENV_PREFIX, LOCAL_CONFIG_FILE};
use crate::error::Result;

/// Assembles every configuration source in precedence order.
///
/// # Errors
///
/// Returns an error if an override is not of the form `section/key=value`.
pub fn config_loader(global: &GlobalOptions, command_overrides: &[String]) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_inis {
        loader = loader.add_toml_file_optional(LOCAL_CONFIG_FILE);
    }
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);

    for option in global
        .to_config_overrides()
        .iter()
        .chain(command_overrides)
    {
        loader = loader.set_option(option)?;
    }
    Ok(loader)
}

/// Loads and validates the merged configuration.
///
/// # Errors
///
/// Returns an error if a source is missing or malformed, or validation fails.
pub fn load_config(global: &GlobalOptions, command_overrides: &[String]) -> Result<Config> {
    config_loader(global, command_overrides)?
        .build()
        .context("failed to load config")
}

/// Display current configuration options.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized to JSON.
pub fn run_options_command(config: &Config, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(config).context("failed to serialize config")?;
        println!("{rendered}");
    } else {
        for line in config.format_options() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Display loaded configuration files.
pub fn run_inis_command(config_files: &[String]) {
    if config_files.is_empty() {
        println!("No configuration files loaded");
    } else {
        for line in config_files {
            println!("{line}");
        }
    }
}
