//! Implementation of the `noetry list` command.

use anyhow::Result;
use noetry_pkg::{installer, Project};

/// Show the installer's listing of the environment's packages.
pub fn list_packages(project: &Project<'_>) -> Result<()> {
    installer::list(project)?;
    Ok(())
}
