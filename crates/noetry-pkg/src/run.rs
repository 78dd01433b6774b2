//! Running arbitrary commands inside the activated environment.

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::process::{self, Invocation, ToolStatus};
use crate::project::Project;
use std::path::Path;

/// POSIX script: source the activation script (`$1`), then run the
/// remaining positional parameters as the command.
const POSIX_SCRIPT: &str = r#". "$1" && shift && "$@""#;

/// Build the shell invocation that activates the environment and then runs
/// `command`.
///
/// On POSIX the command words are handed to `sh` as positional parameters
/// rather than spliced into the script, so they need no escaping. `cmd.exe`
/// has no such mechanism and receives them after `&&`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedPlatform`] on any other platform.
pub fn shell_invocation(platform: Platform, activate: &Path, command: &[String]) -> Result<Invocation> {
    match platform {
        Platform::Posix => Ok(Invocation::new("sh")
            .arg("-c")
            .arg(POSIX_SCRIPT)
            .arg("noetry")
            .arg(activate)
            .args(command)),
        Platform::Windows => Ok(Invocation::new("cmd.exe")
            .args(["/C", "call"])
            .arg(activate)
            .arg("&&")
            .args(command)
            .label("cmd")),
        Platform::Unsupported => Err(Error::UnsupportedPlatform),
    }
}

/// Run `command` with the environment activated, streaming its output.
///
/// Returns the command's exit status; a non-zero status is not an error at
/// this layer.
pub fn run_in_environment(project: &Project<'_>, command: &[String]) -> Result<ToolStatus> {
    let env = project.environment();
    if !env.exists() {
        return Err(Error::EnvironmentNotFound(env.dir().to_path_buf()));
    }

    let activate = env.activation_script();
    let invocation = shell_invocation(project.platform(), &activate, command)?
        .current_dir(project.root());

    tracing::debug!(command = ?command, activate = %activate.display(), "running in environment");
    process::launch(&invocation, project.runner().status(&invocation))
}
