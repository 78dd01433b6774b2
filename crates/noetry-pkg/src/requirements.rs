//! The package manifest (`requirements.txt`).
//!
//! The manifest is a derived snapshot of the environment: [`resync`] replaces
//! it wholesale with the installer's `freeze` output after every mutation.
//! The only other writer is the Poetry importer, which transcribes declared
//! constraints without installing anything.

use crate::error::{Error, Result};
use crate::layout::ProjectLayout;
use crate::process::{self, Invocation};
use crate::project::Project;
use std::io::Write;
use std::path::Path;

/// One `name<spec>` line of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Distribution name as written.
    pub name: String,
    /// Everything after the name, e.g. `==2.31.0` or `^2.0`.
    pub spec: String,
}

impl Requirement {
    /// Parse one manifest line. Blank lines, comments and option lines
    /// (`-e ...`, `--index-url ...`) yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() || line.starts_with('-') {
            return None;
        }
        let end = line
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(line.len());
        if end == 0 {
            return None;
        }
        Some(Self {
            name: line[..end].to_string(),
            spec: line[end..].trim().to_string(),
        })
    }

    /// Name normalized for comparison: lowercase, runs of `-_.` collapsed to `-`.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.spec)
    }
}

/// Normalize a distribution name the way package indexes compare them.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

/// Parsed contents of the package manifest, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    entries: Vec<Requirement>,
}

impl Requirements {
    pub fn parse(content: &str) -> Self {
        Self {
            entries: content.lines().filter_map(Requirement::parse).collect(),
        }
    }

    /// Load the manifest at `path`; a missing file reads as empty.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn entries(&self) -> &[Requirement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by (normalized) name.
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        let wanted = normalize_name(name);
        self.entries.iter().find(|r| r.normalized_name() == wanted)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Compare against a later snapshot.
    pub fn diff(&self, newer: &Self) -> RequirementsDiff {
        let mut diff = RequirementsDiff::default();

        for new in &newer.entries {
            match self.get(&new.name) {
                None => diff.added.push(new.clone()),
                Some(old) if old.spec != new.spec => diff.updated.push(RequirementChange {
                    name: new.name.clone(),
                    old: old.spec.clone(),
                    new: new.spec.clone(),
                }),
                Some(_) => {}
            }
        }
        for old in &self.entries {
            if !newer.contains(&old.name) {
                diff.removed.push(old.clone());
            }
        }

        diff
    }
}

/// Changes between two manifest snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementsDiff {
    pub added: Vec<Requirement>,
    pub removed: Vec<Requirement>,
    pub updated: Vec<RequirementChange>,
}

/// A package whose pinned spec changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementChange {
    pub name: String,
    pub old: String,
    pub new: String,
}

impl RequirementsDiff {
    /// Returns true if the snapshots list the same packages and specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

impl std::fmt::Display for RequirementsDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for req in &self.added {
            writeln!(f, "  + {req}")?;
        }
        for req in &self.removed {
            writeln!(f, "  - {req}")?;
        }
        for change in &self.updated {
            writeln!(f, "  ~ {} {} -> {}", change.name, change.old, change.new)?;
        }
        Ok(())
    }
}

/// Replace the package manifest with `content`.
///
/// The new content goes to a temporary file in the project directory which
/// is then renamed over the manifest, so readers never see a partial file.
pub(crate) fn write_manifest(layout: &ProjectLayout, content: &str) -> Result<()> {
    let path = layout.requirements_path();
    let mut tmp = tempfile::NamedTempFile::new_in(layout.root())?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(&path).map_err(|e| e.error)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote package manifest");
    Ok(())
}

/// Regenerate the package manifest from the environment's installed set.
///
/// Runs the installer's `freeze` and writes its output verbatim. Nothing is
/// written if the environment is missing or `freeze` fails.
pub fn resync(project: &Project<'_>) -> Result<Requirements> {
    let env = project.environment();
    if !env.exists() {
        return Err(Error::EnvironmentNotFound(env.dir().to_path_buf()));
    }

    let invocation = Invocation::new(env.pip())
        .arg("freeze")
        .current_dir(project.root())
        .label("pip freeze");
    let frozen = process::capture_checked(project.runner(), &invocation)?;

    write_manifest(project.layout(), &frozen)?;
    Ok(Requirements::parse(&frozen))
}
