// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for CLI parsing.
//!
//! Parses realistic command lines and feeds the resulting overrides through
//! the configuration loader.

use clap::Parser;
use splines_build::cli::{Cli, Command};
use splines_build::config::Config;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("splines-build").chain(args.iter().copied())).unwrap()
}

fn config_for(cli: &Cli, toml: &str) -> Config {
    let mut loader = Config::builder().add_toml_str(toml);
    let command_overrides = cli
        .command
        .as_ref()
        .map(Command::config_overrides)
        .unwrap_or_default();
    for option in cli.global.to_config_overrides().iter().chain(&command_overrides) {
        loader = loader.set_option(option).unwrap();
    }
    loader.build().unwrap()
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn cli_every_command_parses() {
    for args in [
        &["version"][..],
        &["options"],
        &["inis"],
        &["resolve", "https://example.test/a"],
        &["fetch", "https://example.test/a", "a.tgz"],
        &["extract", "a.tgz", "out"],
        &["deps"],
        &["build"],
        &["test"],
        &["clean"],
        &["submodules"],
    ] {
        assert!(
            Cli::try_parse_from(std::iter::once("splines-build").chain(args.iter().copied()))
                .is_ok(),
            "failed to parse {args:?}"
        );
    }
}

#[test]
fn cli_missing_required_args() {
    for args in [
        &["resolve"][..],
        &["fetch", "https://example.test/a"],
        &["extract", "a.tgz"],
    ] {
        assert!(
            Cli::try_parse_from(std::iter::once("splines-build").chain(args.iter().copied()))
                .is_err(),
            "{args:?} should be rejected"
        );
    }
}

#[test]
fn cli_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["splines-build", "release"]).is_err());
}

#[test]
fn cli_invalid_log_level() {
    assert!(Cli::try_parse_from(["splines-build", "-l", "9", "build"]).is_err());
}

#[test]
fn cli_invalid_timeout() {
    assert!(
        Cli::try_parse_from(["splines-build", "fetch", "http://x.test/", "x", "--timeout", "0"])
            .is_err()
    );
}

// =============================================================================
// Overrides reaching the configuration
// =============================================================================

#[test]
fn cli_net_flags_reach_config() {
    let cli = parse(&[
        "resolve",
        "https://example.test/a",
        "--max-hops",
        "2",
        "--user-agent",
        "curl/8.5",
    ]);
    let config = config_for(&cli, "");

    assert_eq!(config.net.max_hops, 2);
    assert_eq!(config.net.user_agent, "curl/8.5");
    assert!(!config.net.accept_invalid_certs);
}

#[test]
fn cli_flags_override_set_and_file() {
    let cli = parse(&["-s", "net/max_hops=7", "fetch", "http://x.test/a", "a", "--max-hops", "3"]);
    let config = config_for(&cli, "[net]\nmax_hops = 20\n");

    assert_eq!(config.net.max_hops, 3);
}

#[test]
fn cli_set_overrides_file() {
    let cli = parse(&["--set", "build/jobs=12", "--set", "build/build_dir=out", "build"]);
    let config = config_for(&cli, "[build]\njobs = 2\n");

    assert_eq!(config.build.jobs, 12);
    assert_eq!(config.build.build_dir, std::path::Path::new("out"));
}

#[test]
fn cli_build_flags_reach_config() {
    let cli = parse(&["build", "--debug", "--dynamic", "--no-install", "-j", "3"]);
    let config = config_for(&cli, "");

    assert!(config.build.debug);
    assert!(config.build.dynamic);
    assert!(!config.build.install);
    assert_eq!(config.build.jobs, 3);
}

#[test]
fn cli_global_flags_reach_config() {
    let cli = parse(&["clean", "--dry", "-l", "4", "--log-file", "splines.log"]);
    let config = config_for(&cli, "");

    assert!(config.global.dry);
    assert_eq!(config.global.output_log_level.as_u8(), 4);
    assert_eq!(config.global.file_log_level.as_u8(), 4);
    assert_eq!(config.global.log_file, std::path::Path::new("splines.log"));
}

#[test]
fn cli_invalid_set_option_rejected() {
    assert!(Config::builder().set_option("no_section=1").is_err());
    assert!(Config::builder().set_option("net/max_hops").is_err());
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn cli_no_command_reports_error_once() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_splines-build"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.trim_end(),
        "Error: No command specified. Use --help for usage information."
    );
    assert_eq!(stderr.matches("No command specified").count(), 1);
}
