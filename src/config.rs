use crate::error::{Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Packages installed into every new environment unless configured otherwise
pub const DEFAULT_REQUIREMENTS: &[&str] = &[
    "wheel",
    "setuptools",
    "pip-tools",
    "pytest",
    "black",
    "flake8",
    "mypy",
];

/// Typed view of the configuration, resolved through stored values and defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub env_name: String,
    pub python_version: String,
    pub requirements: Vec<String>,
    pub log_level: String,
    pub parallel_install: bool,
    pub no_cache: bool,
    pub force_cleanup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env_name: "BuildEnv".to_string(),
            python_version: "3.6".to_string(),
            requirements: DEFAULT_REQUIREMENTS.iter().map(|r| r.to_string()).collect(),
            log_level: "INFO".to_string(),
            parallel_install: true,
            no_cache: true,
            force_cleanup: false,
        }
    }
}

/// Default location of the user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pyenvbuilder").join("config.json"))
}

/// Key-value configuration store, optionally bound to a JSON file
#[derive(Debug, Clone)]
pub struct Config {
    values: Map<String, Value>,
    defaults: Map<String, Value>,
    file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let defaults = default_values();
        Self {
            values: defaults.clone(),
            defaults,
            file: None,
        }
    }
}

fn default_values() -> Map<String, Value> {
    match serde_json::to_value(Settings::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl Config {
    /// Loads configuration from `path`, or uses the built-in defaults
    ///
    /// A missing file is created with the defaults. A file that is not a JSON
    /// object is ignored and the defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        let Some(path) = path else {
            return Ok(config);
        };
        config.file = Some(path.to_path_buf());

        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| Error::FileOperation {
                path: path.to_path_buf(),
                message: format!("Failed to read configuration: {}", e),
            })?;

            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => {
                    debug!("Loaded configuration from {}", path.display());
                    config.values = map;
                }
                Ok(_) => debug!(
                    "Configuration at {} is not a JSON object, using defaults",
                    path.display()
                ),
                Err(e) => debug!(
                    "Failed to parse configuration at {}, using defaults: {}",
                    path.display(),
                    e
                ),
            }
        } else {
            info!("Writing default configuration to {}", path.display());
            config.save()?;
        }

        Ok(config)
    }

    /// Path of the backing file, if any
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Writes the current values to the backing file, if one is bound
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::FileOperation {
                    path: parent.to_path_buf(),
                    message: format!("Failed to create configuration directory: {}", e),
                })?;
            }
        }

        let content = self.to_pretty_json()?;
        fs::write(path, content + "\n").map_err(|e| Error::FileOperation {
            path: path.clone(),
            message: format!("Failed to write configuration: {}", e),
        })?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Stored value, then built-in default
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).or_else(|| self.defaults.get(key))
    }

    /// Stored value, then built-in default, then `default`
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Sets a value and persists it immediately
    pub fn set<S: Into<String>>(&mut self, key: S, value: Value) -> Result<()> {
        self.values.insert(key.into(), value);
        self.save()
    }

    /// Merges several values and persists once
    pub fn update(&mut self, values: Map<String, Value>) -> Result<()> {
        self.values.extend(values);
        self.save()
    }

    /// Restores the built-in defaults and persists them
    pub fn reset(&mut self) -> Result<()> {
        self.values = self.defaults.clone();
        self.save()
    }

    /// Sets a value for this process only, leaving the backing file untouched
    pub fn override_value<S: Into<String>>(&mut self, key: S, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Resolves every documented key into a typed snapshot
    pub fn settings(&self) -> Result<Settings> {
        serde_json::from_value(Value::Object(self.effective())).map_err(|e| Error::Config {
            path: self.file.clone(),
            message: e.to_string(),
        })
    }

    /// Stored values as pretty JSON, in the format written to disk
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.values)?)
    }

    /// Interprets a raw command-line value for `key`
    ///
    /// Keys whose default is a string keep the raw text, so `3.10` stays a
    /// version rather than becoming a number. Other keys are parsed as JSON,
    /// falling back to a plain string.
    pub fn parse_value(&self, key: &str, raw: &str) -> Value {
        match self.defaults.get(key) {
            Some(Value::String(_)) => Value::String(raw.to_string()),
            _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        }
    }

    /// Effective value of every key, defaults included
    pub fn effective(&self) -> Map<String, Value> {
        let mut merged = self.defaults.clone();
        merged.extend(self.values.clone());
        merged
    }
}
