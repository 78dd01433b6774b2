//! Implementation of the `noetry add` command.

use anyhow::{Context, Result};
use noetry_pkg::{installer, PackageChange, Project, REQUIREMENTS_FILE};

/// Print how a package change affected `requirements.txt`.
pub fn print_summary(change: &PackageChange) {
    if change.diff.is_empty() {
        println!("{REQUIREMENTS_FILE} unchanged");
    } else {
        println!("Updated {REQUIREMENTS_FILE}:");
        print!("{}", change.diff);
    }
}

/// Install a package into the environment and resync `requirements.txt`.
pub fn add_package(project: &Project<'_>, package: &str) -> Result<()> {
    let change = installer::install(project, package)
        .with_context(|| format!("Failed to install `{package}`"))?;

    println!("Installed package: {package}");
    print_summary(&change);
    Ok(())
}
