use crate::config::Settings;
use crate::environment::create::{REQUIREMENTS_FILE, resolve_project_dir};
use crate::error::{Error, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCRIPT_NAME: &str = "setup_python_env.sh";

/// Shell script that recreates and activates the environment outside this tool
pub fn render_activation_script(env_name: &str) -> String {
    format!(
        r#"#!/bin/bash

# Get the directory of this script
SCRIPT_DIR="$( cd "$( dirname "${{BASH_SOURCE[0]}}" )" && pwd )"
ENV_DIR="$SCRIPT_DIR/{env_dir}"

# Create virtual environment if it doesn't exist
if [ ! -d "$ENV_DIR" ]; then
    echo "Creating Python virtual environment..."
    python3 -m venv "$ENV_DIR"
fi

# Activate virtual environment
source "$ENV_DIR/bin/activate"

# Upgrade pip
python -m pip install --upgrade pip

# Install requirements if {requirements} exists
if [ -f "$SCRIPT_DIR/{requirements}" ]; then
    echo "Installing requirements..."
    pip install -r "$SCRIPT_DIR/{requirements}"
fi

# Keep the virtual environment activated
exec "$SHELL"
"#,
        env_dir = quote_path_segment(env_name),
        requirements = REQUIREMENTS_FILE,
    )
}

/// Text placed inside the double-quoted `ENV_DIR` assignment
///
/// Plain names go in as they are. Anything else leaves the double quotes for a
/// single-quoted word, so `"`, `$` and backticks reach bash literally.
fn quote_path_segment(name: &str) -> String {
    let plain = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if plain {
        name.to_string()
    } else {
        format!("\"'{}'\"", name.replace('\'', r"'\''"))
    }
}

/// Writes `setup_python_env.sh` into the project and marks it executable
pub fn write_activation_script(project_path: &Path, settings: &Settings) -> Result<PathBuf> {
    let project_dir = resolve_project_dir(project_path)?;
    let script_path = project_dir.join(SCRIPT_NAME);

    fs::write(&script_path, render_activation_script(&settings.env_name)).map_err(|e| {
        Error::FileOperation {
            path: script_path.clone(),
            message: format!("Failed to write activation script: {}", e),
        }
    })?;
    make_executable(&script_path)?;

    info!("Created Xcode build script at {}", script_path.display());
    Ok(script_path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
        Error::FileOperation {
            path: path.to_path_buf(),
            message: format!("Failed to mark script executable: {}", e),
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
