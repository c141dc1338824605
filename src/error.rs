use std::fmt;
use std::io;
use std::path::PathBuf;

/// Custom error type for pyenvbuilder operations
#[derive(Debug)]
pub enum Error {
    /// I/O errors (file access, permissions, etc.)
    Io(io::Error),

    /// JSON parsing or serialization errors
    Json(serde_json::Error),

    /// An external tool could not be spawned or exited unsuccessfully
    Command { program: String, message: String },

    /// The project directory is missing or unusable
    InvalidProject { path: PathBuf, reason: String },

    /// Creation refused because the target environment directory is present
    EnvironmentExists(PathBuf),

    /// A path failed virtual environment validation
    InvalidEnvironment { path: PathBuf, reason: String },

    /// Deletion refused because the target is the active environment
    ActiveEnvironment(PathBuf),

    /// One or more pre-installation checks failed
    ChecksFailed { failed: usize },

    /// Errors related to file operations
    FileOperation { path: PathBuf, message: String },

    /// Configuration values of the wrong shape
    Config { path: Option<PathBuf>, message: String },

    /// General errors
    General(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Command { program, message } => write!(f, "{} failed: {}", program, message),
            Error::InvalidProject { path, reason } => {
                write!(f, "Invalid project directory {}: {}", path.display(), reason)
            }
            Error::EnvironmentExists(path) => {
                write!(f, "Virtual environment already exists at {}", path.display())
            }
            Error::InvalidEnvironment { path, reason } => {
                write!(f, "Not a valid virtual environment {}: {}", path.display(), reason)
            }
            Error::ActiveEnvironment(path) => write!(
                f,
                "Cannot delete currently active virtual environment: {}",
                path.display()
            ),
            Error::ChecksFailed { failed } => {
                write!(f, "Pre-installation checks failed ({} failing)", failed)
            }
            Error::FileOperation { path, message } => {
                write!(f, "File operation error on {}: {}", path.display(), message)
            }
            Error::Config {
                path: Some(path),
                message,
            } => write!(f, "Configuration error in {}: {}", path.display(), message),
            Error::Config { path: None, message } => {
                write!(f, "Configuration error: {}", message)
            }
            Error::General(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error {
    /// Check if the error message contains a specific string
    pub fn contains(&self, needle: &str) -> bool {
        self.to_string().contains(needle)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::General(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::General(err.to_string())
    }
}

/// Result type alias for pyenvbuilder operations
pub type Result<T> = std::result::Result<T, Error>;
