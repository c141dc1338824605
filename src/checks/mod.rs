use crate::config::Settings;
use crate::models::{CheckReport, CheckResult};
use crate::utils::{CommandRunner, ToolCommand, parse_dotted_version, parse_interpreter_version};
use log::debug;
use std::path::{Path, PathBuf};

pub mod project;

pub use project::{check_project_directory, has_traversal};

pub const PYTHON_VERSION: &str = "python_version";
pub const VENV: &str = "venv";
pub const PIP: &str = "pip";
pub const XCODE: &str = "xcode";
pub const SYSTEM_DEPENDENCIES: &str = "system_dependencies";

/// Build tools that must answer `--version`
pub const SYSTEM_TOOLS: &[&str] = &["git", "make", "gcc"];

/// Runs the pre-installation checks against the host and a project directory
///
/// Each check is independent and returns a [`CheckResult`]. [`Preflight::run_all`]
/// collects every verdict so the caller can show all of them, not only the
/// first failure.
pub struct Preflight<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    python: PathBuf,
    require_xcode: bool,
}

impl<'a> Preflight<'a> {
    /// Missing Xcode tools are a hard failure only on macOS
    pub fn new<P: Into<PathBuf>>(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        python: P,
    ) -> Self {
        Self {
            settings,
            runner,
            python: python.into(),
            require_xcode: cfg!(target_os = "macos"),
        }
    }

    /// Overrides whether missing Xcode tools fail the aggregate
    pub fn require_xcode(mut self, required: bool) -> Self {
        self.require_xcode = required;
        self
    }

    pub fn run_all(&self, project_path: &Path) -> CheckReport {
        let report = CheckReport::new(vec![
            self.check_python_version(),
            self.check_venv_available(),
            self.check_pip_available(),
            self.check_xcode_tools(),
            check_project_directory(project_path),
            self.check_system_dependencies(),
        ]);
        debug!(
            "Pre-installation checks finished: {} of {} failing",
            report.failures(),
            report.results().len()
        );
        report
    }

    pub fn check_python_version(&self) -> CheckResult {
        let minimum = &self.settings.python_version;
        let required = match parse_dotted_version(minimum) {
            Ok(version) => version,
            Err(e) => {
                return CheckResult::fail(
                    PYTHON_VERSION,
                    format!("Invalid minimum Python version in configuration: {}", e),
                );
            }
        };

        let output = match ToolCommand::new(&self.python)
            .arg("--version")
            .execute(self.runner)
        {
            Ok(output) if output.success => output,
            Ok(output) => {
                return CheckResult::fail(
                    PYTHON_VERSION,
                    format!("Failed to query Python version: {}", output.failure_message()),
                );
            }
            Err(e) => {
                return CheckResult::fail(
                    PYTHON_VERSION,
                    format!("Failed to query Python version: {}", e),
                );
            }
        };

        let banner = format!("{}\n{}", output.stdout, output.stderr);
        let current = match parse_interpreter_version(&banner) {
            Ok(version) => version,
            Err(e) => return CheckResult::fail(PYTHON_VERSION, e.to_string()),
        };

        if current < required {
            return CheckResult::fail(
                PYTHON_VERSION,
                format!(
                    "Python {} or higher is required (found {})",
                    minimum, current
                ),
            );
        }

        CheckResult::pass(
            PYTHON_VERSION,
            format!("Python version {} meets requirements", current),
        )
    }

    pub fn check_venv_available(&self) -> CheckResult {
        let command = ToolCommand::new(&self.python).args(["-c", "import venv"]);
        match command.execute(self.runner) {
            Ok(output) if output.success => CheckResult::pass(VENV, "venv module is available"),
            _ => CheckResult::fail(VENV, "venv module is not available"),
        }
    }

    pub fn check_pip_available(&self) -> CheckResult {
        let command = ToolCommand::new(&self.python).args(["-m", "pip", "--version"]);
        match command.execute(self.runner) {
            Ok(output) if output.success => CheckResult::pass(
                PIP,
                format!(
                    "pip is available and working (version: {})",
                    output.stdout.trim()
                ),
            ),
            _ => CheckResult::fail(PIP, "pip is not available or not working"),
        }
    }

    pub fn check_xcode_tools(&self) -> CheckResult {
        match ToolCommand::new("xcode-select").arg("-p").execute(self.runner) {
            Ok(output) if output.success => CheckResult::pass(
                XCODE,
                format!(
                    "Xcode Command Line Tools are installed at {}",
                    output.stdout.trim()
                ),
            ),
            _ if self.require_xcode => {
                CheckResult::fail(XCODE, "Xcode Command Line Tools are not installed")
            }
            _ => CheckResult::warn(
                XCODE,
                "Xcode Command Line Tools not found (only required on macOS)",
            ),
        }
    }

    pub fn check_system_dependencies(&self) -> CheckResult {
        let missing: Vec<&str> = SYSTEM_TOOLS
            .iter()
            .copied()
            .filter(|tool| {
                !matches!(
                    ToolCommand::new(tool).arg("--version").execute(self.runner),
                    Ok(output) if output.success
                )
            })
            .collect();

        if missing.is_empty() {
            CheckResult::pass(
                SYSTEM_DEPENDENCIES,
                "All required system dependencies are installed",
            )
        } else {
            CheckResult::fail(
                SYSTEM_DEPENDENCIES,
                format!(
                    "Missing required system dependencies: {}",
                    missing.join(", ")
                ),
            )
        }
    }
}
