//! Project-local Python environment management for Noetry.
//!
//! This crate provides:
//! - Lifecycle of the project's `.venv` environment
//! - Installing and removing packages with `requirements.txt` kept in sync
//! - The declarative `.noetry.yml` config
//! - Running commands inside the activated environment
//! - Importing a Poetry `pyproject.toml`

pub mod config;
pub mod environment;
mod error;
pub mod installer;
mod layout;
mod platform;
pub mod poetry;
mod process;
mod project;
pub mod requirements;
pub mod run;

#[cfg(test)]
mod testutil;

pub use config::{ConfigError, InitOutcome, ProjectConfig, DEFAULT_PYTHON_VERSION};
pub use environment::{locate_executable, CreateOutcome, DeleteOutcome, Environment};
pub use error::{Error, ErrorKind, Result};
pub use installer::PackageChange;
pub use layout::{ProjectLayout, CONFIG_FILE, POETRY_FILE, REQUIREMENTS_FILE, VENV_DIR};
pub use platform::Platform;
pub use poetry::{ImportOutcome, PoetryDependencies};
pub use process::{Invocation, SystemRunner, ToolOutput, ToolRunner, ToolStatus};
pub use project::Project;
pub use requirements::{Requirement, Requirements, RequirementsDiff};
