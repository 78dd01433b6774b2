//! Implementation of the `noetry convert` command.

use anyhow::{Context, Result};
use noetry_pkg::{poetry, Project, REQUIREMENTS_FILE};

use crate::init::report_init;

/// Convert the project's Poetry manifest into `requirements.txt` and `.noetry.yml`.
pub fn convert_from_poetry(project: &Project<'_>) -> Result<()> {
    let outcome = poetry::import(project).context("Failed to convert Poetry project")?;

    println!(
        "Wrote {} requirement(s) to {REQUIREMENTS_FILE}",
        outcome.requirements.len()
    );
    for skipped in &outcome.skipped {
        eprintln!("Warning: skipped `{}`: {}", skipped.name, skipped.reason);
    }

    report_init(project, &outcome.init);
    println!("Converted Poetry project to Noetry.");
    Ok(())
}
