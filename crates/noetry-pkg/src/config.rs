//! Declarative project config (`.noetry.yml`) parsing and persistence.

use crate::environment::{self, CreateOutcome};
use crate::error::{Error, Result};
use crate::layout::ProjectLayout;
use crate::project::Project;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Interpreter version written by `init` when no config exists yet.
pub const DEFAULT_PYTHON_VERSION: &str = "3.9";

/// Errors that can occur when working with the declarative config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("invalid Python version '{0}': {1}")]
    InvalidPythonVersion(String, String),
}

/// The complete `.noetry.yml` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Interpreter version the project targets (required).
    #[serde(deserialize_with = "version_string")]
    pub python_version: String,

    /// Keys this version of Noetry does not interpret, kept on rewrite.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Accept `python_version: 3.11` as well as the quoted form.
fn version_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "python_version must be a string, found {other:?}"
        ))),
    }
}

impl ProjectConfig {
    /// Create a config targeting the given interpreter version.
    pub fn new(python_version: impl Into<String>) -> Self {
        Self {
            python_version: python_version.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Load a config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a config from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the version is malformed.
    pub fn parse(content: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        validate_python_version(&config.python_version)?;
        Ok(config)
    }

    /// Serialize the config to a YAML string.
    pub fn to_yaml_string(&self) -> std::result::Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON_VERSION)
    }
}

/// Check that `version` looks like `3`, `3.9` or `3.9.18`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPythonVersion`] describing the problem.
pub fn validate_python_version(version: &str) -> std::result::Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidPythonVersion(version.to_string(), reason.to_string());

    let parts: Vec<&str> = version.split('.').collect();
    if version.is_empty() || parts.len() > 3 {
        return Err(invalid("expected one to three dot-separated numbers"));
    }
    if parts
        .iter()
        .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(invalid("components must be numeric"));
    }

    // Pad to major.minor.patch so semver can check the rest
    let mut padded = parts.clone();
    padded.resize(3, "0");
    semver::Version::parse(&padded.join(".")).map_err(|e| invalid(&e.to_string()))?;

    Ok(())
}

/// Read the project's declarative config.
///
/// # Errors
///
/// Returns [`Error::ConfigNotFound`] if `.noetry.yml` does not exist.
pub fn read_config(layout: &ProjectLayout) -> Result<ProjectConfig> {
    let path = layout.config_path();
    if !path.exists() {
        return Err(Error::ConfigNotFound(path));
    }
    Ok(ProjectConfig::from_path(&path)?)
}

/// Persist the project's declarative config, replacing any existing file.
pub fn write_config(layout: &ProjectLayout, config: &ProjectConfig) -> Result<()> {
    let content = config.to_yaml_string()?;
    std::fs::write(layout.config_path(), content).map_err(ConfigError::Io)?;
    tracing::info!(path = %layout.config_path().display(), "wrote config");
    Ok(())
}

/// What [`init_if_absent`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A config already existed; nothing was touched.
    AlreadyExists,
    /// A default config was written and the environment step ran.
    Initialized {
        python_version: String,
        environment: CreateOutcome,
    },
}

/// Write a default config and create the environment, unless a config exists.
///
/// An existing config is never rewritten.
pub fn init_if_absent(project: &Project<'_>) -> Result<InitOutcome> {
    let layout = project.layout();
    if layout.config_path().exists() {
        tracing::debug!("config already present, skipping init");
        return Ok(InitOutcome::AlreadyExists);
    }

    let config = ProjectConfig::default();
    write_config(layout, &config)?;
    let environment = environment::create(project)?;

    Ok(InitOutcome::Initialized {
        python_version: config.python_version,
        environment,
    })
}

/// Persist a new interpreter version into an existing config.
///
/// The environment is left as it is; it has to be recreated to pick the
/// version up.
pub fn set_python_version(layout: &ProjectLayout, version: &str) -> Result<ProjectConfig> {
    validate_python_version(version)?;
    let mut config = read_config(layout)?;
    config.python_version = version.to_string();
    write_config(layout, &config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeRunner;
    use crate::Platform;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal_config() {
        let config = ProjectConfig::parse("python_version: '3.11'\n").unwrap();
        assert_eq!(config.python_version, "3.11");
        assert!(config.extra.is_empty());
    }

    #[test]
    fn parse_unquoted_version() {
        let config = ProjectConfig::parse("python_version: 3.9\n").unwrap();
        assert_eq!(config.python_version, "3.9");
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let config = ProjectConfig::parse("python_version: '3.10'\nmirror: internal\n").unwrap();
        assert_eq!(
            config.extra.get("mirror"),
            Some(&serde_yaml::Value::String("internal".to_string()))
        );
        let written = config.to_yaml_string().unwrap();
        assert!(written.contains("mirror: internal"));
        assert_eq!(ProjectConfig::parse(&written).unwrap(), config);
    }

    #[test]
    fn missing_version_is_parse_error() {
        let err = ProjectConfig::parse("mirror: internal\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validate_versions() {
        assert!(validate_python_version("3").is_ok());
        assert!(validate_python_version("3.9").is_ok());
        assert!(validate_python_version("3.12.1").is_ok());
        assert!(validate_python_version("").is_err());
        assert!(validate_python_version("3.x").is_err());
        assert!(validate_python_version("3..9").is_err());
        assert!(validate_python_version("3.9.1.2").is_err());
        assert!(validate_python_version("v3.9").is_err());
    }

    #[test]
    fn read_missing_config_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        let err = read_config(&layout).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn init_writes_default_and_creates_environment() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        let project = Project::new(tmp.path(), Platform::Posix, &runner);

        let outcome = init_if_absent(&project).unwrap();
        assert_eq!(
            outcome,
            InitOutcome::Initialized {
                python_version: DEFAULT_PYTHON_VERSION.to_string(),
                environment: CreateOutcome::Created,
            }
        );
        let config = read_config(project.layout()).unwrap();
        assert_eq!(config.python_version, DEFAULT_PYTHON_VERSION);
        assert!(project.environment().exists());
    }

    #[test]
    fn init_twice_keeps_existing_config() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        let project = Project::new(tmp.path(), Platform::Posix, &runner);

        init_if_absent(&project).unwrap();
        std::fs::write(
            project.layout().config_path(),
            "python_version: '3.12'\n# edited by hand\n",
        )
        .unwrap();
        let before = std::fs::read(project.layout().config_path()).unwrap();

        let outcome = init_if_absent(&project).unwrap();
        assert_eq!(outcome, InitOutcome::AlreadyExists);
        let after = std::fs::read(project.layout().config_path()).unwrap();
        assert_eq!(before, after);
        assert_eq!(runner.invocations_of("venv").len(), 1);
    }

    #[test]
    fn set_python_requires_config() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        let err = set_python_version(&layout, "3.11").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn set_python_persists_version() {
        let tmp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        write_config(&layout, &ProjectConfig::default()).unwrap();

        set_python_version(&layout, "3.12").unwrap();
        assert_eq!(read_config(&layout).unwrap().python_version, "3.12");

        let err = set_python_version(&layout, "latest").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidPythonVersion(..))
        ));
        assert_eq!(read_config(&layout).unwrap().python_version, "3.12");
    }
}
