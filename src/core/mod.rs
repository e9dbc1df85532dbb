// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules for processes, platform detection and build settings.
//!
//! ```text
//!            core
//!             |
//!     +-------+--------+
//!     |       |        |
//!     v       v        v
//! platform  settings  process
//!     |       |        |
//! Platform  Build-   Builder
//! Arch      Settings Output
//! ```

pub mod platform;
pub mod process;
pub mod settings;
