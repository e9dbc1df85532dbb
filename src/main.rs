// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config (files, env, --set, flags) --> Logging --> Command Dispatch
//!   Resolve | Fetch | Extract | Deps | Build | Test | Clean | Submodules | Config
//! ```

use std::process::ExitCode;

use splines_build::cli::{self, Command};
use splines_build::cmd::build::{run_build_command, run_clean_command, run_test_command};
use splines_build::cmd::cancel_on_ctrl_c;
use splines_build::cmd::config::{
    config_loader, load_config, run_inis_command, run_options_command,
};
use splines_build::cmd::deps::run_deps_command;
use splines_build::cmd::git::run_submodules_command;
use splines_build::cmd::net::{run_extract_command, run_fetch_command, run_resolve_command};
use splines_build::error::Result;
use splines_build::logging::init_logging;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    match dispatch_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch_command(cli: &cli::Cli) -> Result<()> {
    let Some(command) = &cli.command else {
        anyhow::bail!("No command specified. Use --help for usage information.");
    };

    match command {
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Inis => {
            let loader = config_loader(&cli.global, &[])?;
            run_inis_command(&loader.format_loaded_files());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli.global, &command.config_overrides())?;
    let _log_guard = init_logging(&config.log_config())
        .map_err(|e| e.context("failed to initialize logging"))?;
    let token = cancel_on_ctrl_c();

    match command {
        Command::Version | Command::Inis => Ok(()),
        Command::Options(args) => run_options_command(&config, args.json),
        Command::Resolve(args) => run_resolve_command(args, &config, token).await,
        Command::Fetch(args) => run_fetch_command(args, &config, token).await,
        Command::Extract(args) => run_extract_command(args, &config, token).await,
        Command::Deps(args) => run_deps_command(args, &config, token).await,
        Command::Build(args) => run_build_command(args, &config, token).await,
        Command::Test => run_test_command(&config, token).await,
        Command::Clean => run_clean_command(&config, token).await,
        Command::Submodules(args) => run_submodules_command(args, &config, token).await,
    }
}
