//! External tool invocation.
//!
//! Every subprocess Noetry starts (the environment creator, the installer,
//! the shell used by `run`) goes through a [`ToolRunner`]. Calls are blocking
//! and have no timeout.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// A single external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: OsString,
    /// Arguments, passed as-is without shell interpretation.
    pub args: Vec<OsString>,
    /// Working directory, inherited when unset.
    pub current_dir: Option<PathBuf>,
    label: String,
}

impl Invocation {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        let program = program.into();
        let label = Path::new(&program)
            .file_stem()
            .unwrap_or(program.as_os_str())
            .to_string_lossy()
            .into_owned();
        Self {
            program,
            args: Vec::new(),
            current_dir: None,
            label,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the inherited working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Override the short name used in logs and error messages.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Short human-readable name, e.g. `pip install`.
    pub fn name(&self) -> &str {
        &self.label
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Exit status of a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    code: Option<i32>,
}

impl ToolStatus {
    /// Status with the given exit code; `None` means killed by a signal.
    #[must_use]
    pub fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    /// Whether the tool exited with code 0.
    #[must_use]
    pub fn success(self) -> bool {
        self.code == Some(0)
    }

    /// The exit code, if the tool exited normally.
    #[must_use]
    pub fn code(self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for ToolStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools to completion.
pub trait ToolRunner {
    /// Run with the caller's stdin, stdout and stderr.
    fn status(&self, invocation: &Invocation) -> io::Result<ToolStatus>;

    /// Run with stdout and stderr captured.
    fn output(&self, invocation: &Invocation) -> io::Result<ToolOutput>;
}

/// [`ToolRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn status(&self, invocation: &Invocation) -> io::Result<ToolStatus> {
        tracing::debug!(tool = invocation.name(), ?invocation, "spawning");
        let status = invocation
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.into())
    }

    fn output(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        tracing::debug!(tool = invocation.name(), ?invocation, "spawning (captured)");
        let output = invocation.to_command().stdin(Stdio::null()).output()?;
        Ok(ToolOutput {
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a tool with inherited stdio and fail on a non-zero exit.
pub(crate) fn run_checked(runner: &dyn ToolRunner, invocation: &Invocation) -> Result<()> {
    let status = launch(invocation, runner.status(invocation))?;
    check(invocation, status)
}

/// Run a tool, returning its stdout and failing on a non-zero exit.
///
/// The tool's stderr is forwarded verbatim when it fails.
pub(crate) fn capture_checked(runner: &dyn ToolRunner, invocation: &Invocation) -> Result<String> {
    let output = launch(invocation, runner.output(invocation))?;
    if !output.status.success() {
        if let Err(e) = io::stderr().write_all(output.stderr.as_bytes()) {
            tracing::debug!(tool = invocation.name(), error = %e, "could not forward tool stderr");
        }
    }
    check(invocation, output.status)?;
    Ok(output.stdout)
}

pub(crate) fn launch<T>(invocation: &Invocation, result: io::Result<T>) -> Result<T> {
    result.map_err(|source| Error::ToolLaunch {
        tool: invocation.name().to_string(),
        source,
    })
}

fn check(invocation: &Invocation, status: ToolStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        tracing::warn!(tool = invocation.name(), code = ?status.code(), "tool failed");
        Err(Error::ToolFailed {
            tool: invocation.name().to_string(),
            code: status.code(),
        })
    }
}
