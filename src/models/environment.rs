use std::path::{Path, PathBuf};

/// Name of the marker file every `venv`-created environment carries
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Where a virtual environment keeps its interpreter on the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformLayout {
    /// `bin/python` (macOS, Linux and other Unix systems)
    Posix,
    /// `Scripts\python.exe`
    Windows,
}

impl PlatformLayout {
    /// Layout of the platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            PlatformLayout::Windows
        } else {
            PlatformLayout::Posix
        }
    }

    /// Directory holding executables inside an environment
    pub fn scripts_dir(&self) -> &'static str {
        match self {
            PlatformLayout::Posix => "bin",
            PlatformLayout::Windows => "Scripts",
        }
    }

    /// File name of the interpreter inside the scripts directory
    pub fn interpreter_name(&self) -> &'static str {
        match self {
            PlatformLayout::Posix => "python",
            PlatformLayout::Windows => "python.exe",
        }
    }

    pub fn interpreter_path(&self, env_root: &Path) -> PathBuf {
        env_root
            .join(self.scripts_dir())
            .join(self.interpreter_name())
    }
}

impl Default for PlatformLayout {
    fn default() -> Self {
        Self::current()
    }
}

/// A virtual environment directory and the interpreter derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    root: PathBuf,
    layout: PlatformLayout,
}

impl VirtualEnv {
    pub fn new<P: Into<PathBuf>>(root: P, layout: PlatformLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    /// Environment named `env_name` inside `project_dir`
    pub fn in_project(project_dir: &Path, env_name: &str, layout: PlatformLayout) -> Self {
        Self::new(project_dir.join(env_name), layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> PlatformLayout {
        self.layout
    }

    pub fn interpreter(&self) -> PathBuf {
        self.layout.interpreter_path(&self.root)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(PYVENV_CFG)
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    pub fn has_interpreter(&self) -> bool {
        self.interpreter().is_file()
    }
}
