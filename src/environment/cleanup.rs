use crate::checks::has_traversal;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{PYVENV_CFG, PlatformLayout, VirtualEnv};
use crate::utils::Confirmation;
use log::{debug, info};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a cleanup that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The environment directory was deleted
    Removed(PathBuf),
    /// The user declined the confirmation prompt
    Cancelled,
}

/// Root of the virtual environment activated in the calling shell, if any
pub fn active_environment() -> Option<PathBuf> {
    let venv = env::var_os("VIRTUAL_ENV")?;
    if venv.is_empty() {
        return None;
    }
    let path = PathBuf::from(venv);
    Some(fs::canonicalize(&path).unwrap_or(path))
}

/// Checks that `path` is a genuine virtual environment directory
pub fn is_valid_venv(path: &Path, layout: PlatformLayout) -> Result<()> {
    let invalid = |reason: String| Error::InvalidEnvironment {
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(invalid("path does not exist".to_string()));
    }
    if !path.is_dir() {
        return Err(invalid("path is not a directory".to_string()));
    }
    if has_traversal(path) {
        return Err(invalid("path traversal detected".to_string()));
    }

    let env = VirtualEnv::new(path, layout);
    let interpreter = env.interpreter();
    if !interpreter.exists() {
        return Err(invalid(format!(
            "Python executable not found at {}",
            interpreter.display()
        )));
    }

    let cfg = env.config_file();
    let content = fs::read_to_string(&cfg)
        .map_err(|e| invalid(format!("cannot read {}: {}", PYVENV_CFG, e)))?;
    if !declares_home(&content) {
        return Err(invalid(format!("{} does not declare a 'home' key", PYVENV_CFG)));
    }

    Ok(())
}

/// `pyvenv.cfg` is `key = value` lines; `venv` always writes `home`
fn declares_home(content: &str) -> bool {
    content.lines().any(|line| {
        line.split_once('=')
            .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("home"))
    })
}

/// Validates and deletes virtual environments
pub struct EnvironmentCleaner<'a> {
    settings: &'a Settings,
    layout: PlatformLayout,
    active_env: Option<PathBuf>,
}

impl<'a> EnvironmentCleaner<'a> {
    /// Uses `VIRTUAL_ENV` to find the environment that must not be removed
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            layout: PlatformLayout::current(),
            active_env: active_environment(),
        }
    }

    pub fn with_layout(mut self, layout: PlatformLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_active_environment(mut self, active_env: Option<PathBuf>) -> Self {
        self.active_env = active_env;
        self
    }

    /// Deletes the environment at `env_path` after validation and confirmation
    ///
    /// `force` falls back to the `force_cleanup` setting when not given.
    pub fn cleanup(
        &self,
        env_path: &Path,
        force: Option<bool>,
        confirm: &dyn Confirmation,
    ) -> Result<CleanupOutcome> {
        let env_dir = fs::canonicalize(env_path).map_err(|e| Error::InvalidEnvironment {
            path: env_path.to_path_buf(),
            reason: format!("cannot resolve path: {}", e),
        })?;

        // Already resolved, so the `..` check inside only matters to direct callers
        is_valid_venv(&env_dir, self.layout)?;

        let force = force.unwrap_or(self.settings.force_cleanup);
        if !force {
            let prompt = format!("Are you sure you want to delete {}?", env_dir.display());
            if !confirm.confirm(&prompt) {
                info!("Cleanup cancelled");
                return Ok(CleanupOutcome::Cancelled);
            }
        }

        if self.is_active(&env_dir) {
            return Err(Error::ActiveEnvironment(env_dir));
        }

        info!("Removing virtual environment at {}", env_dir.display());
        fs::remove_dir_all(&env_dir).map_err(|e| Error::FileOperation {
            path: env_dir.clone(),
            message: format!("Failed to remove environment: {}", e),
        })?;

        info!("Cleanup completed successfully");
        Ok(CleanupOutcome::Removed(env_dir))
    }

    fn is_active(&self, env_dir: &Path) -> bool {
        let Some(active) = &self.active_env else {
            return false;
        };
        let active = fs::canonicalize(active).unwrap_or_else(|_| active.clone());
        debug!(
            "Comparing {} with active environment {}",
            env_dir.display(),
            active.display()
        );
        active == env_dir
    }
}
