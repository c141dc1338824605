#![allow(dead_code)]

use pyenvbuilder::error::{Error, Result};
use pyenvbuilder::models::PlatformLayout;
use pyenvbuilder::utils::{CommandRunner, ToolCommand, ToolOutput};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scripted stand-in for the system runner.
///
/// Every command succeeds unless a rule says otherwise. `python -m venv <dir>`
/// lays out a minimal environment so later stages find an interpreter.
pub struct FakeRunner {
    calls: RefCell<Vec<ToolCommand>>,
    failures: Vec<(String, ToolOutput)>,
    missing: Vec<String>,
    python_version: String,
    simulate_venv: bool,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failures: Vec::new(),
            missing: Vec::new(),
            python_version: "3.12.1".to_string(),
            simulate_venv: true,
        }
    }

    /// Any command whose rendered form contains `pattern` fails with `stderr`
    pub fn fail_when(mut self, pattern: &str, stderr: &str) -> Self {
        self.failures
            .push((pattern.to_string(), ToolOutput::failed(1, stderr)));
        self
    }

    /// Spawning `program` fails as if it were not installed
    pub fn without_program(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn with_python_version(mut self, version: &str) -> Self {
        self.python_version = version.to_string();
        self
    }

    /// `-m venv` succeeds without creating anything
    pub fn without_venv_simulation(mut self) -> Self {
        self.simulate_venv = false;
        self
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn args_of(&self, index: usize) -> Vec<String> {
        self.calls.borrow()[index].arguments().to_vec()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        self.calls.borrow_mut().push(command.clone());

        if self.missing.contains(&command.display_name()) {
            return Err(Error::Command {
                program: command.display_name(),
                message: "failed to execute: No such file or directory".to_string(),
            });
        }

        let rendered = command.to_string();
        if let Some((_, output)) = self
            .failures
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
        {
            return Ok(output.clone());
        }

        let args = command.arguments();
        if args.len() == 3 && args[0] == "-m" && args[1] == "venv" {
            if self.simulate_venv {
                make_fake_venv(Path::new(&args[2]));
            }
            return Ok(ToolOutput::ok(""));
        }

        if args == ["--version"] && command.display_name().starts_with("python") {
            return Ok(ToolOutput::ok(format!("Python {}\n", self.python_version)));
        }

        if args.ends_with(&["pip".to_string(), "--version".to_string()]) {
            return Ok(ToolOutput::ok("pip 24.0 from /usr/lib/python3/site-packages/pip\n"));
        }

        if command.display_name() == "xcode-select" {
            return Ok(ToolOutput::ok("/Library/Developer/CommandLineTools\n"));
        }

        Ok(ToolOutput::ok(""))
    }
}

/// Minimal on-disk layout that passes virtual environment validation
pub fn make_fake_venv(root: &Path) {
    let python = PlatformLayout::current().interpreter_path(root);
    fs::create_dir_all(python.parent().unwrap()).unwrap();
    fs::write(&python, "").unwrap();
    fs::write(
        root.join("pyvenv.cfg"),
        "home = /usr/bin\ninclude-system-site-packages = false\nversion = 3.12.1\n",
    )
    .unwrap();
}

/// Temporary project directory, canonicalized so path comparisons are stable
pub fn create_test_project() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let project_dir = fs::canonicalize(temp_dir.path()).unwrap();
    (temp_dir, project_dir)
}
