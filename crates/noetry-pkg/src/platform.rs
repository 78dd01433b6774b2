//! Host platform detection.
//!
//! The platform is resolved once per process and passed to every operation
//! that depends on it, so executable paths and shell syntax stay consistent
//! within one invocation.

use std::ffi::OsString;

/// The host platform as far as environment layout and shell syntax go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `bin/` layout, POSIX `sh`.
    Posix,
    /// `Scripts/` layout, `cmd.exe`.
    Windows,
    /// Anything else. Commands cannot be run inside the environment.
    Unsupported,
}

impl Platform {
    /// Detect the platform this binary was built for.
    #[must_use]
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(unix) {
            Self::Posix
        } else {
            Self::Unsupported
        }
    }

    /// Name of the environment subdirectory holding executables.
    #[must_use]
    pub fn scripts_dir(self) -> &'static str {
        match self {
            Self::Windows => "Scripts",
            Self::Posix | Self::Unsupported => "bin",
        }
    }

    /// File name of an executable on this platform.
    #[must_use]
    pub fn executable_name(self, name: &str) -> String {
        match self {
            Self::Windows => format!("{name}.exe"),
            Self::Posix | Self::Unsupported => name.to_string(),
        }
    }

    /// Base interpreter used to create environments when none is configured.
    #[must_use]
    pub fn default_python(self) -> OsString {
        match self {
            Self::Windows => OsString::from("python"),
            Self::Posix | Self::Unsupported => OsString::from("python3"),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Posix => "posix",
            Self::Windows => "windows",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{name}")
    }
}
