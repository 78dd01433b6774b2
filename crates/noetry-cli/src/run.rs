//! Implementation of the `noetry run` command.

use anyhow::Result;
use noetry_pkg::{run, Project};
use std::process::ExitCode;

/// Run a command inside the activated environment.
///
/// The command's own exit status becomes Noetry's exit status.
pub fn run_command(project: &Project<'_>, command: &[String]) -> Result<ExitCode> {
    let status = run::run_in_environment(project, command)?;

    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => {
            tracing::warn!(command = ?command, "command was terminated by a signal");
            ExitCode::FAILURE
        }
    })
}
