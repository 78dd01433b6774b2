//! Test helpers: an in-memory stand-in for `venv` and `pip`.

use crate::process::{Invocation, ToolOutput, ToolRunner, ToolStatus};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;

impl Invocation {
    /// Whether any argument equals `needle`.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }
}

/// Records every invocation and simulates the installer's package set.
///
/// `venv` creates a POSIX-style environment skeleton on disk, `pip install`
/// pins packages at `1.0.0`, and `pip freeze` prints the set sorted by name.
#[derive(Debug, Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<Invocation>>,
    installed: RefCell<BTreeMap<String, String>>,
    exit_codes: HashMap<String, i32>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the tool labeled `label` exit with status 1.
    pub fn failing(self, label: &str) -> Self {
        self.exiting(label, 1)
    }

    /// Make the tool labeled `label` exit with `code`.
    pub fn exiting(mut self, label: &str, code: i32) -> Self {
        self.exit_codes.insert(label.to_string(), code);
        self
    }

    /// Pretend `name==version` is already installed.
    pub fn with_installed(self, name: &str, version: &str) -> Self {
        self.installed
            .borrow_mut()
            .insert(name.to_string(), version.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn invocations_of(&self, label: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|inv| inv.name() == label)
            .cloned()
            .collect()
    }

    fn freeze(&self) -> String {
        self.installed
            .borrow()
            .iter()
            .map(|(name, version)| format!("{name}=={version}\n"))
            .collect()
    }

    fn simulate(&self, invocation: &Invocation) -> io::Result<ToolStatus> {
        self.calls.borrow_mut().push(invocation.clone());

        let code = self.exit_codes.get(invocation.name()).copied().unwrap_or(0);
        if code != 0 {
            return Ok(ToolStatus::from_code(Some(code)));
        }

        let last = invocation
            .args
            .last()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default();
        match invocation.name() {
            "venv" => {
                let dir = PathBuf::from(&last);
                fs::create_dir_all(dir.join("bin"))?;
                fs::write(dir.join("bin").join("activate"), "")?;
                fs::write(dir.join("bin").join("pip"), "")?;
            }
            "pip install" => {
                self.installed
                    .borrow_mut()
                    .insert(last, String::from("1.0.0"));
            }
            "pip uninstall" => {
                self.installed.borrow_mut().remove(&last);
            }
            _ => {}
        }
        Ok(ToolStatus::from_code(Some(0)))
    }
}

impl ToolRunner for FakeRunner {
    fn status(&self, invocation: &Invocation) -> io::Result<ToolStatus> {
        self.simulate(invocation)
    }

    fn output(&self, invocation: &Invocation) -> io::Result<ToolOutput> {
        let status = self.simulate(invocation)?;
        let stdout = if status.success() && invocation.name() == "pip freeze" {
            self.freeze()
        } else {
            String::new()
        };
        Ok(ToolOutput {
            status,
            stdout,
            stderr: String::new(),
        })
    }
}
