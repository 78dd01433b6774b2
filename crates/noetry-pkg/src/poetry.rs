//! One-shot import of a Poetry project (`pyproject.toml`).
//!
//! The runtime and development dependency tables are flattened into
//! `requirements.txt` as `name<constraint>` lines. This is a transcription,
//! not an install: nothing is put into the environment until the user
//! installs the listed packages.

use crate::config::{self, InitOutcome};
use crate::error::{Error, Result};
use crate::project::Project;
use crate::requirements;
use serde::Deserialize;
use std::path::Path;

/// Key of the interpreter constraint in Poetry's runtime table.
const PYTHON_KEY: &str = "python";

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Tool,
}

#[derive(Debug, Default, Deserialize)]
struct Tool {
    #[serde(default)]
    poetry: PoetrySection,
}

#[derive(Debug, Default, Deserialize)]
struct PoetrySection {
    #[serde(default)]
    dependencies: toml::Table,

    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: toml::Table,
}

/// A dependency that could not be expressed as a single constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDependency {
    pub name: String,
    pub reason: &'static str,
}

/// The two dependency groups of a Poetry manifest, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoetryDependencies {
    /// `[tool.poetry.dependencies]` minus the interpreter entry.
    pub runtime: Vec<(String, String)>,
    /// `[tool.poetry.dev-dependencies]`.
    pub dev: Vec<(String, String)>,
    /// Entries without a usable version constraint (path, git, multi-constraint).
    pub skipped: Vec<SkippedDependency>,
}

/// Extract the version constraint from a string or `{ version = ... }` table.
fn constraint(value: &toml::Value) -> std::result::Result<String, &'static str> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Table(t) => t
            .get("version")
            .and_then(toml::Value::as_str)
            .map(ToString::to_string)
            .ok_or("no version constraint (path or git dependency)"),
        toml::Value::Array(_) => Err("multiple constraints are not supported"),
        _ => Err("unrecognized dependency specification"),
    }
}

fn collect(
    table: &toml::Table,
    skip_python: bool,
    skipped: &mut Vec<SkippedDependency>,
) -> Vec<(String, String)> {
    let mut entries = Vec::with_capacity(table.len());
    for (name, value) in table {
        if skip_python && name == PYTHON_KEY {
            continue;
        }
        match constraint(value) {
            Ok(c) => entries.push((name.clone(), c)),
            Err(reason) => {
                tracing::warn!(dependency = %name, reason, "skipping dependency");
                skipped.push(SkippedDependency {
                    name: name.clone(),
                    reason,
                });
            }
        }
    }
    entries
}

impl PoetryDependencies {
    /// Parse the dependency groups out of a `pyproject.toml` document.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let pyproject: PyProject = toml::from_str(content)?;
        let section = pyproject.tool.poetry;

        let mut skipped = Vec::new();
        let runtime = collect(&section.dependencies, true, &mut skipped);
        let dev = collect(&section.dev_dependencies, false, &mut skipped);

        Ok(Self {
            runtime,
            dev,
            skipped,
        })
    }

    /// Load and parse a `pyproject.toml` file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::PoetryManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| Error::PoetryParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Runtime entries overlaid with dev entries.
    ///
    /// A dev entry replaces a runtime entry of the same name in place; new
    /// dev entries are appended.
    pub fn merged(&self) -> Vec<(String, String)> {
        let mut merged = self.runtime.clone();
        for (name, constraint) in &self.dev {
            match merged.iter_mut().find(|(existing, _)| existing == name) {
                Some(entry) => entry.1.clone_from(constraint),
                None => merged.push((name.clone(), constraint.clone())),
            }
        }
        merged
    }

    /// The merged entries as `name<constraint>` manifest lines.
    pub fn requirement_lines(&self) -> Vec<String> {
        self.merged()
            .into_iter()
            .map(|(name, constraint)| format!("{name}{constraint}"))
            .collect()
    }
}

/// What [`import`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Lines written to `requirements.txt`.
    pub requirements: Vec<String>,
    pub skipped: Vec<SkippedDependency>,
    /// Result of initializing the config and environment.
    pub init: InitOutcome,
}

/// Convert the project's Poetry manifest into Noetry's files.
///
/// Writes `requirements.txt` from the merged dependency groups, then runs
/// [`config::init_if_absent`].
pub fn import(project: &Project<'_>) -> Result<ImportOutcome> {
    let deps = PoetryDependencies::from_path(&project.layout().poetry_path())?;
    let lines = deps.requirement_lines();

    requirements::write_manifest(project.layout(), &lines.join("\n"))?;
    let init = config::init_if_absent(project)?;

    Ok(ImportOutcome {
        requirements: lines,
        skipped: deps.skipped,
        init,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PYTHON_VERSION;
    use crate::environment::CreateOutcome;
    use crate::testutil::FakeRunner;
    use crate::Platform;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dev_group_wins_on_collision() {
        let deps = PoetryDependencies::parse(
            r#"
[tool.poetry.dependencies]
A = "^1.0"
B = "^2.0"

[tool.poetry.dev-dependencies]
B = "^3.0"
C = "^1.0"
"#,
        )
        .unwrap();

        assert_eq!(deps.requirement_lines(), vec!["A^1.0", "B^3.0", "C^1.0"]);
    }

    #[test]
    fn python_entry_is_dropped() {
        let deps = PoetryDependencies::parse(
            r#"
[tool.poetry.dependencies]
python = "^3.9"
requests = "^2.0"
"#,
        )
        .unwrap();

        let lines = deps.requirement_lines();
        assert_eq!(lines, vec!["requests^2.0"]);
        assert!(!lines.iter().any(|l| l.starts_with("python")));
    }

    #[test]
    fn document_order_is_preserved() {
        let deps = PoetryDependencies::parse(
            r#"
[tool.poetry.dependencies]
zope = "*"
attrs = ">=22"
"#,
        )
        .unwrap();
        assert_eq!(deps.requirement_lines(), vec!["zope*", "attrs>=22"]);
    }

    #[test]
    fn detailed_tables_use_version() {
        let deps = PoetryDependencies::parse(
            r#"
[tool.poetry.dependencies]
black = { version = "^23.1", extras = ["d"] }
mylib = { path = "../mylib" }
"#,
        )
        .unwrap();

        assert_eq!(deps.requirement_lines(), vec!["black^23.1"]);
        assert_eq!(deps.skipped.len(), 1);
        assert_eq!(deps.skipped[0].name, "mylib");
    }

    #[test]
    fn missing_groups_are_empty() {
        let deps = PoetryDependencies::parse("[project]\nname = \"x\"\n").unwrap();
        assert!(deps.merged().is_empty());
    }

    #[test]
    fn import_without_pyproject_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        let project = Project::new(tmp.path(), Platform::Posix, &runner);

        let err = import(&project).unwrap_err();
        assert!(matches!(err, Error::PoetryManifestNotFound(_)));
        assert!(!project.layout().config_path().exists());
        assert!(!project.layout().requirements_path().exists());
    }

    #[test]
    fn import_writes_manifest_and_initializes() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        let project = Project::new(tmp.path(), Platform::Posix, &runner);
        fs::write(
            project.layout().poetry_path(),
            r#"
[tool.poetry]
name = "demo"

[tool.poetry.dependencies]
python = "^3.9"
requests = "^2.0"

[tool.poetry.dev-dependencies]
pytest = "^7.0"
"#,
        )
        .unwrap();

        let outcome = import(&project).unwrap();

        let manifest = fs::read_to_string(project.layout().requirements_path()).unwrap();
        assert_eq!(manifest, "requests^2.0\npytest^7.0");
        assert_eq!(
            outcome.init,
            InitOutcome::Initialized {
                python_version: DEFAULT_PYTHON_VERSION.to_string(),
                environment: CreateOutcome::Created,
            }
        );
        // Nothing is installed by the import itself
        assert!(runner.invocations_of("pip install").is_empty());
    }

    #[test]
    fn invalid_pyproject_is_reported() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        let project = Project::new(tmp.path(), Platform::Posix, &runner);
        fs::write(project.layout().poetry_path(), "[tool.poetry\n").unwrap();

        let err = import(&project).unwrap_err();
        assert!(matches!(err, Error::PoetryParse { .. }));
    }
}
