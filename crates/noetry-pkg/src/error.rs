//! Error types shared by every project operation.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for project operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing a project.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No virtual environment found in this project. Please use 'noetry create'.")]
    EnvironmentNotFound(PathBuf),

    #[error("{} not found. Run `noetry init` first.", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("{} not found in the project directory.", .0.display())]
    PoetryManifestNotFound(PathBuf),

    #[error("Unsupported OS: cannot run commands inside the environment on this platform")]
    UnsupportedPlatform,

    #[error("`{tool}` {}", describe_exit(.code))]
    ToolFailed { tool: String, code: Option<i32> },

    #[error("failed to launch `{tool}`: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to parse {}: {source}", .path.display())]
    PoetryParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid package name '{0}': {1}")]
    InvalidPackageName(String, &'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => String::from("was terminated by a signal"),
    }
}

/// Coarse classification of an [`Error`], used to pick a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Environment, config or Poetry manifest is missing.
    NotFound,
    /// Commands cannot be run on the host platform.
    UnsupportedPlatform,
    /// An external tool could not be launched or exited unsuccessfully.
    ExternalToolFailure,
    /// User input was rejected before anything ran.
    InvalidInput,
    /// Filesystem or serialization failure.
    Io,
}

impl ErrorKind {
    /// The process exit code reported for this kind of failure.
    ///
    /// Exit code 2 is left to the argument parser for usage errors.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::InvalidInput | Self::Io => 1,
            Self::NotFound => 3,
            Self::UnsupportedPlatform => 4,
            Self::ExternalToolFailure => 5,
        }
    }
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EnvironmentNotFound(_)
            | Self::ConfigNotFound(_)
            | Self::PoetryManifestNotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedPlatform => ErrorKind::UnsupportedPlatform,
            Self::ToolFailed { .. } | Self::ToolLaunch { .. } => ErrorKind::ExternalToolFailure,
            Self::InvalidPackageName(..) | Self::PoetryParse { .. } => ErrorKind::InvalidInput,
            Self::Config(ConfigError::InvalidPythonVersion(..) | ConfigError::Parse(_)) => {
                ErrorKind::InvalidInput
            }
            Self::Config(_) | Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_errors_share_exit_code() {
        let errors = [
            Error::EnvironmentNotFound(PathBuf::from(".venv")),
            Error::ConfigNotFound(PathBuf::from(".noetry.yml")),
            Error::PoetryManifestNotFound(PathBuf::from("pyproject.toml")),
        ];
        for err in &errors {
            assert_eq!(err.kind(), ErrorKind::NotFound);
            assert_eq!(err.kind().exit_code(), 3);
        }
    }

    #[test]
    fn tool_failure_message_includes_status() {
        let err = Error::ToolFailed {
            tool: String::from("pip install"),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "`pip install` exited with status 1");
        assert_eq!(err.kind().exit_code(), 5);

        let killed = Error::ToolFailed {
            tool: String::from("pip freeze"),
            code: None,
        };
        assert!(killed.to_string().contains("terminated by a signal"));
    }

    #[test]
    fn environment_message_points_at_create() {
        let err = Error::EnvironmentNotFound(PathBuf::from(".venv"));
        assert!(err.to_string().contains("noetry create"));
    }

    #[test]
    fn unsupported_platform_exit_code() {
        assert_eq!(Error::UnsupportedPlatform.kind().exit_code(), 4);
    }
}
