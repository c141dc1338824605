use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{PlatformLayout, VirtualEnv};
use crate::utils::{CommandRunner, ToolCommand};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest written next to a new environment when the project has none
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Creates a virtual environment inside a project and installs packages into it
pub struct EnvironmentCreator<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    python: PathBuf,
    layout: PlatformLayout,
}

impl<'a> EnvironmentCreator<'a> {
    /// `python` is the host interpreter that runs `-m venv`
    pub fn new<P: Into<PathBuf>>(
        settings: &'a Settings,
        runner: &'a dyn CommandRunner,
        python: P,
    ) -> Self {
        Self {
            settings,
            runner,
            python: python.into(),
            layout: PlatformLayout::current(),
        }
    }

    pub fn with_layout(mut self, layout: PlatformLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Runs every creation stage in order, stopping at the first failure
    ///
    /// A failure after the `venv` stage leaves the directory in place; removing
    /// it is up to the caller.
    pub fn create(&self, project_path: &Path) -> Result<VirtualEnv> {
        let project_dir = resolve_project_dir(project_path)?;
        let env = VirtualEnv::in_project(&project_dir, &self.settings.env_name, self.layout);

        if env.exists() {
            return Err(Error::EnvironmentExists(env.root().to_path_buf()));
        }

        info!("Creating virtual environment at {}", env.root().display());
        ToolCommand::new(&self.python)
            .args(["-m", "venv"])
            .arg(env.root().to_string_lossy())
            .working_dir(&project_dir)
            .execute_success(self.runner)?;

        let interpreter = env.interpreter();
        if !env.has_interpreter() {
            return Err(Error::InvalidEnvironment {
                path: env.root().to_path_buf(),
                reason: format!("Python executable not found at {}", interpreter.display()),
            });
        }
        debug!("Environment interpreter: {}", interpreter.display());

        info!("Upgrading pip");
        ToolCommand::new(&interpreter)
            .args(["-m", "pip", "install", "--upgrade", "pip"])
            .working_dir(&project_dir)
            .execute_success(self.runner)?;

        self.install_packages(&interpreter, &project_dir)?;
        self.write_requirements(&project_dir)?;

        info!("Virtual environment ready at {}", env.root().display());
        Ok(env)
    }

    fn install_packages(&self, interpreter: &Path, project_dir: &Path) -> Result<()> {
        let packages = &self.settings.requirements;
        if packages.is_empty() {
            debug!("No packages configured, skipping installation");
            return Ok(());
        }

        let batches: Vec<&[String]> = if self.settings.parallel_install {
            vec![packages.as_slice()]
        } else {
            packages.chunks(1).collect()
        };

        for batch in batches {
            info!("Installing {}", batch.join(", "));
            let mut install = ToolCommand::new(interpreter)
                .args(["-m", "pip", "install"])
                .args(batch.iter().cloned())
                .working_dir(project_dir);
            if self.settings.no_cache {
                install = install.arg("--no-cache-dir");
            }
            install.execute_success(self.runner)?;
        }

        Ok(())
    }

    fn write_requirements(&self, project_dir: &Path) -> Result<()> {
        let manifest = project_dir.join(REQUIREMENTS_FILE);
        if manifest.exists() {
            debug!("Keeping existing {}", manifest.display());
            return Ok(());
        }

        let mut content = self.settings.requirements.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&manifest, content).map_err(|e| Error::FileOperation {
            path: manifest.clone(),
            message: format!("Failed to write requirements file: {}", e),
        })?;
        info!("Wrote {}", manifest.display());
        Ok(())
    }
}

/// Canonical form of an existing project directory
pub fn resolve_project_dir(project_path: &Path) -> Result<PathBuf> {
    if !project_path.exists() {
        return Err(Error::InvalidProject {
            path: project_path.to_path_buf(),
            reason: "directory does not exist".to_string(),
        });
    }

    let resolved = fs::canonicalize(project_path)?;
    if !resolved.is_dir() {
        return Err(Error::InvalidProject {
            path: project_path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    Ok(resolved)
}
