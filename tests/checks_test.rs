mod common;

use common::{FakeRunner, create_test_project};
use pyenvbuilder::checks::{
    self, PIP, PYTHON_VERSION, Preflight, SYSTEM_DEPENDENCIES, VENV, XCODE,
    check_project_directory,
};
use pyenvbuilder::config::Settings;
use pyenvbuilder::models::{CheckStatus, SUCCESS_MARKER};
use std::fs;

/// Tests that a healthy host passes every check.
///
/// This test verifies that:
/// 1. All six checks run, in order
/// 2. Every message starts with the success marker
#[test]
fn test_run_all_checks_success() {
    let (_temp_dir, project_dir) = create_test_project();
    let settings = Settings::default();
    let runner = FakeRunner::new();

    let report = Preflight::new(&settings, &runner, "python3")
        .require_xcode(true)
        .run_all(&project_dir);

    assert!(report.success());
    assert_eq!(report.results().len(), 6);
    for message in report.messages() {
        assert!(message.starts_with(SUCCESS_MARKER), "unexpected: {}", message);
    }
    assert!(report.get(PIP).unwrap().message.contains("pip 24.0"));
}

/// Tests the version comparison against the configured minimum.
#[test]
fn test_python_version_too_old() {
    let settings = Settings {
        python_version: "3.10".to_string(),
        ..Settings::default()
    };
    let runner = FakeRunner::new().with_python_version("3.9.18");

    let result = Preflight::new(&settings, &runner, "python3").check_python_version();

    assert_eq!(result.status, CheckStatus::Failed);
    assert!(result.message.contains("Python 3.10 or higher is required"));
}

/// Tests that minor versions compare numerically, not as text.
#[test]
fn test_python_version_numeric_comparison() {
    let settings = Settings {
        python_version: "3.9".to_string(),
        ..Settings::default()
    };
    let runner = FakeRunner::new().with_python_version("3.12.1");

    let result = Preflight::new(&settings, &runner, "python3").check_python_version();

    assert_eq!(result.status, CheckStatus::Passed);
    assert!(result.message.contains("3.12.1"));
}

/// Tests that an unparsable configured minimum fails the check.
#[test]
fn test_python_version_invalid_minimum() {
    let settings = Settings {
        python_version: "latest".to_string(),
        ..Settings::default()
    };
    let runner = FakeRunner::new();

    let result = Preflight::new(&settings, &runner, "python3").check_python_version();

    assert_eq!(result.status, CheckStatus::Failed);
    assert!(result.message.contains("Invalid minimum Python version"));
}

/// Tests failures of the interpreter-backed checks.
#[test]
fn test_venv_and_pip_unavailable() {
    let (_temp_dir, project_dir) = create_test_project();
    let settings = Settings::default();
    let runner = FakeRunner::new()
        .fail_when("import venv", "ModuleNotFoundError: No module named 'venv'")
        .fail_when("-m pip --version", "No module named pip");

    let report = Preflight::new(&settings, &runner, "python3")
        .require_xcode(false)
        .run_all(&project_dir);

    assert!(!report.success());
    assert_eq!(report.failures(), 2);
    assert_eq!(report.get(VENV).unwrap().status, CheckStatus::Failed);
    assert_eq!(report.get(PIP).unwrap().status, CheckStatus::Failed);
    assert_eq!(report.get(PYTHON_VERSION).unwrap().status, CheckStatus::Passed);
}

/// Tests that missing Xcode tools only block when required.
#[test]
fn test_xcode_soft_failure() {
    let settings = Settings::default();
    let runner = FakeRunner::new().without_program("xcode-select");

    let soft = Preflight::new(&settings, &runner, "python3")
        .require_xcode(false)
        .check_xcode_tools();
    assert_eq!(soft.status, CheckStatus::Warning);
    assert!(soft.ok());
    assert!(!soft.message.starts_with(SUCCESS_MARKER));

    let hard = Preflight::new(&settings, &runner, "python3")
        .require_xcode(true)
        .check_xcode_tools();
    assert_eq!(hard.status, CheckStatus::Failed);
    assert_eq!(hard.message, "Xcode Command Line Tools are not installed");
}

/// Tests that a warning does not fail the aggregate.
#[test]
fn test_warning_does_not_fail_report() {
    let (_temp_dir, project_dir) = create_test_project();
    let settings = Settings::default();
    let runner = FakeRunner::new().without_program("xcode-select");

    let report = Preflight::new(&settings, &runner, "python3")
        .require_xcode(false)
        .run_all(&project_dir);

    assert!(report.success());
    assert_eq!(report.get(XCODE).unwrap().status, CheckStatus::Warning);
}

/// Tests that every missing build tool is listed, not only the first.
#[test]
fn test_missing_system_dependencies() {
    let settings = Settings::default();
    let runner = FakeRunner::new()
        .without_program("make")
        .fail_when("gcc --version", "");

    let result = Preflight::new(&settings, &runner, "python3").check_system_dependencies();

    assert_eq!(result.status, CheckStatus::Failed);
    assert_eq!(
        result.message,
        "Missing required system dependencies: make, gcc"
    );
    assert_eq!(result.name, SYSTEM_DEPENDENCIES);
}

/// Tests project directory validation for missing and non-directory paths.
#[test]
fn test_project_directory_invalid() {
    let (_temp_dir, project_dir) = create_test_project();

    let missing = check_project_directory(&project_dir.join("missing"));
    assert_eq!(missing.status, CheckStatus::Failed);
    assert!(missing.message.contains("does not exist"));

    let file = project_dir.join("file.txt");
    fs::write(&file, "").unwrap();
    let not_dir = check_project_directory(&file);
    assert_eq!(not_dir.status, CheckStatus::Failed);
    assert!(not_dir.message.contains("not a directory"));

    let valid = check_project_directory(&project_dir);
    assert_eq!(valid.status, CheckStatus::Passed);
    assert_eq!(fs::read_dir(&project_dir).unwrap().count(), 1);
}

/// Tests that a relative path with `..` is accepted once it resolves.
#[test]
fn test_project_directory_resolves_parent_segments() {
    let (_temp_dir, project_dir) = create_test_project();
    fs::create_dir(project_dir.join("app")).unwrap();
    fs::create_dir(project_dir.join("other")).unwrap();

    let result = check_project_directory(&project_dir.join("other").join("..").join("app"));
    assert_eq!(result.status, CheckStatus::Passed);
    assert!(checks::has_traversal(&project_dir.join("..")));
}

/// Tests that an unreachable project path fails the aggregate.
///
/// This test verifies that:
/// 1. A path below a regular file is reported as missing
/// 2. The report fails while the other checks still pass
#[test]
fn test_project_directory_below_file_fails_report() {
    let (_temp_dir, project_dir) = create_test_project();
    let file = project_dir.join("file.txt");
    fs::write(&file, "").unwrap();
    let settings = Settings::default();
    let runner = FakeRunner::new();

    let report = Preflight::new(&settings, &runner, "python3")
        .require_xcode(false)
        .run_all(&file.join("project"));

    assert!(!report.success());
    assert_eq!(report.failures(), 1);
    let result = report.get(checks::project::PROJECT_DIRECTORY).unwrap();
    assert_eq!(result.status, CheckStatus::Failed);
    assert!(result.message.contains("does not exist"));
}

/// Tests that an unreadable directory fails the aggregate.
#[cfg(unix)]
#[test]
fn test_project_directory_without_read_permission() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp_dir, project_dir) = create_test_project();
    let locked = project_dir.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o300)).unwrap();

    // Privileged users can read regardless of mode bits
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("skipping: mode bits are not enforced for this user");
        return;
    }

    let settings = Settings::default();
    let runner = FakeRunner::new();
    let report = Preflight::new(&settings, &runner, "python3")
        .require_xcode(false)
        .run_all(&locked);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!report.success());
    let result = report.get(checks::project::PROJECT_DIRECTORY).unwrap();
    assert!(!result.message.starts_with(SUCCESS_MARKER));
    assert!(result.message.contains("not readable"));
}
