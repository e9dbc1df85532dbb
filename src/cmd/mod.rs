// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers --> tools (ToolContext)
//!   config, net, deps, build, git
//! ```

pub mod build;
pub mod config;
pub mod deps;
pub mod git;
pub mod net;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::tools::ToolContext;

/// Returns a token that is cancelled on the first Ctrl+C.
#[must_use]
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received Ctrl+C, interrupting...");
            cancel_token.cancel();
        }
    });
    token
}

/// Builds the context every tool of a command shares.
#[must_use]
pub fn tool_context(config: &Config, cancel_token: CancellationToken) -> ToolContext {
    ToolContext::new(Arc::new(config.clone()), cancel_token, config.global.dry)
}
