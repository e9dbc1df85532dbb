// splines-build: Splines Build Helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build platform detection.
//!
//! ```text
//! config build.platform ──set──> Platform
//!          │ unset
//!          v
//!   cfg!(windows)? ──no──> MSYSTEM=MINGW*/MSYS/UCRT*/CLANG*? ──> Mingw | Posix
//!          │ yes
//!          v
//!   MSYSTEM set? ──> Mingw | Windows
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable exported by MSYS2 shells.
const MSYSTEM_VAR: &str = "MSYSTEM";

/// Host flavour that decides generator and parallel-build behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux, macOS and other Unix-likes.
    Posix,
    /// Native Windows with a Visual Studio toolchain.
    Windows,
    /// MinGW/MSYS2 toolchains.
    Mingw,
}

impl Platform {
    /// Detects the platform from the build target and `MSYSTEM`.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_parts(cfg!(windows), std::env::var(MSYSTEM_VAR).ok().as_deref())
    }

    /// Uses `configured` when set, otherwise detects.
    #[must_use]
    pub fn resolve(configured: Option<Self>) -> Self {
        configured.unwrap_or_else(Self::detect)
    }

    fn from_parts(windows: bool, msystem: Option<&str>) -> Self {
        let msys = msystem.is_some_and(|value| {
            let value = value.to_ascii_uppercase();
            ["MINGW", "MSYS", "UCRT", "CLANG"]
                .iter()
                .any(|prefix| value.starts_with(prefix))
        });
        match (windows, msys) {
            (_, true) => Self::Mingw,
            (true, false) => Self::Windows,
            (false, false) => Self::Posix,
        }
    }

    /// Generator passed to `cmake -G` when none is configured.
    #[must_use]
    pub const fn default_generator(self) -> Option<&'static str> {
        match self {
            Self::Posix | Self::Windows => None,
            Self::Mingw => Some("MinGW Makefiles"),
        }
    }

    /// Whether `cmake --build --parallel` is used with the given cmake version.
    #[must_use]
    pub const fn supports_parallel(self, cmake: (u32, u32)) -> bool {
        match self {
            Self::Windows => false,
            Self::Posix | Self::Mingw => cmake.0 > 3 || (cmake.0 == 3 && cmake.1 >= 12),
        }
    }

    /// Whether `-A <arch>` applies to generators on this platform.
    #[must_use]
    pub const fn uses_architecture(self) -> bool {
        match self {
            Self::Windows => true,
            Self::Posix | Self::Mingw => false,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Posix => write!(f, "posix"),
            Self::Windows => write!(f, "windows"),
            Self::Mingw => write!(f, "mingw"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "posix" | "linux" | "mac" | "macos" => Ok(Self::Posix),
            "windows" | "win" => Ok(Self::Windows),
            "mingw" | "msys" => Ok(Self::Mingw),
            _ => Err(ConfigError::InvalidValue {
                section: "build".to_string(),
                key: "platform".to_string(),
                message: format!("expected posix, windows or mingw, got '{s}'"),
            }),
        }
    }
}

/// Target architecture for multi-arch generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X86,
    X64,
}

impl Architecture {
    /// Value for `cmake -A`.
    #[must_use]
    pub const fn cmake_name(self) -> &'static str {
        match self {
            Self::X86 => "Win32",
            Self::X64 => "x64",
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X86 => write!(f, "x86"),
            Self::X64 => write!(f, "x64"),
        }
    }
}
