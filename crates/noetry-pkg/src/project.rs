//! The context every project operation runs against.

use crate::environment::Environment;
use crate::layout::ProjectLayout;
use crate::platform::Platform;
use crate::process::ToolRunner;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A project directory plus the host capabilities operations need.
///
/// Nothing here is process-global: the project root, platform and tool
/// runner are all chosen by the caller.
pub struct Project<'a> {
    layout: ProjectLayout,
    platform: Platform,
    runner: &'a dyn ToolRunner,
    base_python: OsString,
}

impl<'a> Project<'a> {
    /// Create a project context rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, platform: Platform, runner: &'a dyn ToolRunner) -> Self {
        Self {
            layout: ProjectLayout::new(root),
            platform,
            runner,
            base_python: platform.default_python(),
        }
    }

    /// Use `python` as the interpreter that creates environments.
    #[must_use]
    pub fn with_base_python(mut self, python: impl Into<OsString>) -> Self {
        self.base_python = python.into();
        self
    }

    /// The project directory.
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn runner(&self) -> &'a dyn ToolRunner {
        self.runner
    }

    /// Interpreter used to create the environment.
    pub fn base_python(&self) -> &OsStr {
        &self.base_python
    }

    /// The project's environment (which may not exist yet).
    pub fn environment(&self) -> Environment {
        Environment::new(self.layout.venv_dir(), self.platform)
    }
}

impl std::fmt::Debug for Project<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.layout.root())
            .field("platform", &self.platform)
            .field("base_python", &self.base_python)
            .finish_non_exhaustive()
    }
}
