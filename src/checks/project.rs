use crate::models::CheckResult;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path};

pub const PROJECT_DIRECTORY: &str = "project_directory";

/// True if any segment of `path` is `..`
pub fn has_traversal(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Validates that the project directory exists, is a directory and is usable
///
/// The path is resolved before the traversal check, so a relative
/// `../project` is accepted once it resolves to a real directory.
pub fn check_project_directory(project_path: &Path) -> CheckResult {
    let shown = project_path.display();

    if !project_path.exists() {
        return CheckResult::fail(
            PROJECT_DIRECTORY,
            format!("Project directory does not exist: {}", shown),
        );
    }

    let path = match fs::canonicalize(project_path) {
        Ok(path) => path,
        Err(e) => {
            return CheckResult::fail(PROJECT_DIRECTORY, format!("Invalid project path: {}", e));
        }
    };

    if !path.is_dir() {
        return CheckResult::fail(
            PROJECT_DIRECTORY,
            format!("Project path is not a directory: {}", shown),
        );
    }

    // `path` is already canonical here, so this only trips on filesystems that keep `..`
    if has_traversal(&path) {
        return CheckResult::fail(
            PROJECT_DIRECTORY,
            "Invalid project path: path traversal detected",
        );
    }

    if let Err(e) = fs::read_dir(&path) {
        return CheckResult::fail(
            PROJECT_DIRECTORY,
            format!(
                "Insufficient permissions for project directory {}: not readable ({})",
                shown, e
            ),
        );
    }

    if let Err(e) = try_write(&path) {
        return CheckResult::fail(
            PROJECT_DIRECTORY,
            format!(
                "Insufficient permissions for project directory {}: not writable ({})",
                shown, e
            ),
        );
    }

    CheckResult::pass(
        PROJECT_DIRECTORY,
        format!("Project directory {} is valid and secure", shown),
    )
}

fn try_write(dir: &Path) -> io::Result<()> {
    let scratch = dir.join(format!(".pyenvbuilder-write-test-{}", std::process::id()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&scratch)?;
    fs::remove_file(&scratch)
}
