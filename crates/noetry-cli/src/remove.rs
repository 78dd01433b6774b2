//! Implementation of the `noetry remove` command.

use anyhow::{Context, Result};
use noetry_pkg::{installer, Project};

use crate::add::print_summary;

/// Uninstall a package from the environment and resync `requirements.txt`.
pub fn remove_package(project: &Project<'_>, package: &str) -> Result<()> {
    let change = installer::uninstall(project, package)
        .with_context(|| format!("Failed to uninstall `{package}`"))?;

    println!("Uninstalled package: {package}");
    print_summary(&change);
    Ok(())
}
