//! Implementation of the `noetry create` and `noetry delete` commands.

use anyhow::{Context, Result};
use noetry_pkg::environment;
use noetry_pkg::{CreateOutcome, DeleteOutcome, Project};

/// Print the result of an environment creation step.
pub fn report_create(project: &Project<'_>, outcome: CreateOutcome) {
    let dir = project.layout().venv_dir();
    match outcome {
        CreateOutcome::Created => println!("Created virtual environment at: {}", dir.display()),
        CreateOutcome::AlreadyExists => {
            println!("Virtual environment already exists at: {}", dir.display());
        }
    }
}

/// Create the project's virtual environment.
pub fn create(project: &Project<'_>) -> Result<()> {
    let outcome =
        environment::create(project).context("Failed to create virtual environment")?;
    report_create(project, outcome);
    Ok(())
}

/// Delete the project's virtual environment.
pub fn delete(project: &Project<'_>) -> Result<()> {
    let dir = project.layout().venv_dir();
    let outcome =
        environment::delete(project).context("Failed to delete virtual environment")?;

    match outcome {
        DeleteOutcome::Deleted => println!("Deleted virtual environment at: {}", dir.display()),
        DeleteOutcome::NotPresent => println!("No virtual environment at: {}", dir.display()),
    }
    Ok(())
}
