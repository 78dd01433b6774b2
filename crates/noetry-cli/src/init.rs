//! Project initialization for `noetry init` and `noetry set-python`.

use anyhow::{Context, Result};
use noetry_pkg::config;
use noetry_pkg::{InitOutcome, Project, CONFIG_FILE};

use crate::env::report_create;

/// Print the result of an initialization step.
pub fn report_init(project: &Project<'_>, outcome: &InitOutcome) {
    match outcome {
        InitOutcome::AlreadyExists => println!("{CONFIG_FILE} already exists."),
        InitOutcome::Initialized {
            python_version,
            environment,
        } => {
            println!("Initialized {CONFIG_FILE} with default Python version {python_version}.");
            report_create(project, *environment);
        }
    }
}

/// Initialize `.noetry.yml` and the virtual environment, unless already initialized.
pub fn init_project(project: &Project<'_>) -> Result<()> {
    let outcome = config::init_if_absent(project).context("Failed to initialize project")?;
    report_init(project, &outcome);
    Ok(())
}

/// Record a new Python version in `.noetry.yml`.
pub fn set_python(project: &Project<'_>, version: &str) -> Result<()> {
    let config = config::set_python_version(project.layout(), version)
        .context("Failed to set Python version")?;

    println!(
        "Set Python version to {} in {CONFIG_FILE}.",
        config.python_version
    );
    if project.environment().exists() {
        println!("Recreate the environment to use it: noetry delete && noetry create");
    }
    Ok(())
}
