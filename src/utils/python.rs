use crate::error::{Error, Result};
use log::debug;
use regex::Regex;
use semver::Version;
use std::path::PathBuf;

/// Interpreter names tried, in order, when locating the host Python
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Locate the host Python interpreter used to create environments
pub fn find_python() -> Result<PathBuf> {
    for candidate in PYTHON_CANDIDATES {
        match which::which(candidate) {
            Ok(path) => {
                debug!("Using host interpreter {}", path.display());
                return Ok(path);
            }
            Err(e) => debug!("'{}' not found on PATH: {}", candidate, e),
        }
    }

    Err(Error::General(
        "No Python interpreter found. Please install Python 3 and ensure 'python3' is in your PATH."
            .to_string(),
    ))
}

/// Parses a dotted version such as `3`, `3.6` or `3.11.4`, padding missing parts with zero
pub fn parse_dotted_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(Error::General(format!(
            "Invalid version '{}': expected MAJOR[.MINOR[.PATCH]]",
            version
        )));
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| {
            Error::General(format!(
                "Invalid version '{}': '{}' is not a number",
                version, part
            ))
        })?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Extracts the interpreter version from `python --version` output
///
/// Python 2 and early Python 3 releases print the banner on stderr, so callers
/// should pass both streams concatenated.
pub fn parse_interpreter_version(output: &str) -> Result<Version> {
    let re = Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?")
        .map_err(|e| Error::General(format!("Invalid version pattern: {}", e)))?;

    let caps = re.captures(output).ok_or_else(|| {
        Error::General(format!(
            "Unexpected python version format: '{}'",
            output.trim()
        ))
    })?;

    let part = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    Ok(Version::new(part(1), part(2), part(3)))
}
