//! Lifecycle of the project's isolated interpreter environment.

use crate::error::Result;
use crate::platform::Platform;
use crate::process::{self, Invocation};
use crate::project::Project;
use std::path::{Path, PathBuf};

/// Name of the installer executable inside an environment.
pub const PIP: &str = "pip";

/// Name of the activation entry point inside an environment.
pub const ACTIVATE: &str = "activate";

/// Resolve the path of `name` inside the environment at `env_dir`.
///
/// Depends only on the arguments and never probes the filesystem, so every
/// lookup within one process agrees.
#[must_use]
pub fn locate_executable(env_dir: &Path, name: &str, platform: Platform) -> PathBuf {
    env_dir
        .join(platform.scripts_dir())
        .join(platform.executable_name(name))
}

/// An environment directory, which may or may not exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    dir: PathBuf,
    platform: Platform,
}

impl Environment {
    pub fn new(dir: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            dir: dir.into(),
            platform,
        }
    }

    /// The environment root, e.g. `<project>/.venv`.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the environment directory is present.
    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    /// Path of an executable inside the environment.
    pub fn executable(&self, name: &str) -> PathBuf {
        locate_executable(&self.dir, name, self.platform)
    }

    /// Path of the environment's installer.
    pub fn pip(&self) -> PathBuf {
        self.executable(PIP)
    }

    /// Path of the activation entry point.
    ///
    /// Unlike [`Environment::executable`] this probes the disk: the POSIX
    /// `bin/activate` is used when present, `Scripts/activate` otherwise.
    pub fn activation_script(&self) -> PathBuf {
        let posix = self.dir.join(Platform::Posix.scripts_dir()).join(ACTIVATE);
        if posix.exists() {
            posix
        } else {
            self.dir.join(Platform::Windows.scripts_dir()).join(ACTIVATE)
        }
    }
}

/// What [`create`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new environment was provisioned.
    Created,
    /// The environment directory was already there and was left alone.
    AlreadyExists,
}

/// Provision the project's environment, with pip, via `<python> -m venv`.
///
/// An existing environment directory is never rebuilt.
pub fn create(project: &Project<'_>) -> Result<CreateOutcome> {
    let env = project.environment();
    if env.exists() {
        tracing::info!(dir = %env.dir().display(), "environment already exists");
        return Ok(CreateOutcome::AlreadyExists);
    }

    let invocation = Invocation::new(project.base_python())
        .args(["-m", "venv"])
        .arg(env.dir())
        .current_dir(project.root())
        .label("venv");
    process::run_checked(project.runner(), &invocation)?;

    tracing::info!(dir = %env.dir().display(), "created environment");
    Ok(CreateOutcome::Created)
}

/// What [`delete`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete.
    NotPresent,
}

/// Recursively remove the project's environment. Missing is not an error.
pub fn delete(project: &Project<'_>) -> Result<DeleteOutcome> {
    let env = project.environment();
    if !env.exists() {
        return Ok(DeleteOutcome::NotPresent);
    }
    std::fs::remove_dir_all(env.dir())?;
    tracing::info!(dir = %env.dir().display(), "deleted environment");
    Ok(DeleteOutcome::Deleted)
}
