//! Installing and removing packages inside the environment.
//!
//! Every successful mutation ends with a full manifest [`resync`], so
//! `requirements.txt` always matches the installed set after `add` or
//! `remove` returns.

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::process::{self, Invocation};
use crate::project::Project;
use crate::requirements::{resync, Requirements, RequirementsDiff};

/// Result of a successful install or uninstall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChange {
    /// The package the user asked for.
    pub package: String,
    /// The manifest after resync.
    pub requirements: Requirements,
    /// How the manifest changed.
    pub diff: RequirementsDiff,
}

/// Reject names the installer would read as options.
fn validate_package_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidPackageName(
            name.to_string(),
            "package name cannot be empty",
        ));
    }
    if name.starts_with('-') {
        return Err(Error::InvalidPackageName(
            name.to_string(),
            "package name cannot start with '-'",
        ));
    }
    Ok(())
}

fn existing_environment(project: &Project<'_>) -> Result<Environment> {
    let env = project.environment();
    if env.exists() {
        Ok(env)
    } else {
        Err(Error::EnvironmentNotFound(env.dir().to_path_buf()))
    }
}

/// The manifest as it was before a mutation, for reporting the diff.
///
/// Resync rewrites the file afterwards, so an unreadable or non-UTF-8
/// manifest must not stop the installer from running.
fn previous_manifest(project: &Project<'_>) -> Requirements {
    let path = project.layout().requirements_path();
    match std::fs::read(&path) {
        Ok(bytes) => Requirements::parse(&String::from_utf8_lossy(&bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Requirements::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read previous manifest");
            Requirements::default()
        }
    }
}

/// Run one installer subcommand, then resync the manifest.
fn mutate(project: &Project<'_>, package: &str, subcommand: &str, extra: &[&str]) -> Result<PackageChange> {
    validate_package_name(package)?;
    let env = existing_environment(project)?;
    let before = previous_manifest(project);

    let invocation = Invocation::new(env.pip())
        .arg(subcommand)
        .args(extra.iter().copied())
        .arg(package)
        .current_dir(project.root())
        .label(format!("pip {subcommand}"));
    process::run_checked(project.runner(), &invocation)?;

    let requirements = resync(project)?;
    let diff = before.diff(&requirements);
    tracing::info!(package, subcommand, changes = ?diff, "environment updated");

    Ok(PackageChange {
        package: package.to_string(),
        requirements,
        diff,
    })
}

/// Install `package` (any installer requirement specifier) and resync.
///
/// Installer failures are surfaced as-is and never retried; the manifest is
/// left untouched in that case.
pub fn install(project: &Project<'_>, package: &str) -> Result<PackageChange> {
    mutate(project, package, "install", &[])
}

/// Uninstall `package` without prompting and resync.
pub fn uninstall(project: &Project<'_>, package: &str) -> Result<PackageChange> {
    mutate(project, package, "uninstall", &["-y"])
}

/// Print the installer's own package listing to stdout.
pub fn list(project: &Project<'_>) -> Result<()> {
    let env = existing_environment(project)?;
    let invocation = Invocation::new(env.pip())
        .arg("list")
        .current_dir(project.root())
        .label("pip list");
    process::run_checked(project.runner(), &invocation)
}
