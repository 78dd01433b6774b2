//! Project structure and fixed artifact locations.
//!
//! Every Noetry project is a plain directory with this layout:
//! ```text
//! my-project/
//! ├── .noetry.yml           # Declarative config (hand-edited)
//! ├── requirements.txt      # Package manifest (derived snapshot)
//! ├── pyproject.toml        # Poetry manifest (optional, import source)
//! └── .venv/                # Isolated interpreter environment
//! ```

use std::path::{Path, PathBuf};

/// The declarative config filename.
pub const CONFIG_FILE: &str = ".noetry.yml";

/// The package manifest filename.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// The environment directory name.
pub const VENV_DIR: &str = ".venv";

/// The Poetry manifest filename read by `convert`.
pub const POETRY_FILE: &str = "pyproject.toml";

/// Paths of a project rooted at a directory.
///
/// A project has no creation step of its own; any directory is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout for the project rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to `.noetry.yml`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to `requirements.txt`.
    pub fn requirements_path(&self) -> PathBuf {
        self.root.join(REQUIREMENTS_FILE)
    }

    /// Path to the environment directory.
    pub fn venv_dir(&self) -> PathBuf {
        self.root.join(VENV_DIR)
    }

    /// Path to `pyproject.toml`.
    pub fn poetry_path(&self) -> PathBuf {
        self.root.join(POETRY_FILE)
    }
}
