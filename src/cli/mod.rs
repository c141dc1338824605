use crate::checks::Preflight;
use crate::config::{Config, default_config_path};
use crate::environment::{
    CleanupOutcome, EnvironmentCleaner, EnvironmentCreator, write_activation_script,
};
use crate::error::{Error, Result};
use crate::models::{CheckReport, CheckStatus};
use crate::utils::{CommandRunner, StdinConfirmation, find_python};
use clap::{Arg, ArgAction, ArgMatches, Command};
use env_logger::{Builder, Env};
use log::{LevelFilter, error, info, warn};
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Command line arguments for pyenvbuilder
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub command: Commands,

    /// Explicit configuration file
    pub config: Option<PathBuf>,

    /// Host interpreter used to create environments
    pub python: Option<PathBuf>,

    pub verbose: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Commands {
    Create {
        project_path: PathBuf,
        env_name: Option<String>,
        python_version: Option<String>,
    },
    Cleanup {
        project_path: PathBuf,
        env_path: Option<PathBuf>,
        /// `None` defers to the `force_cleanup` setting
        force: Option<bool>,
    },
    Check {
        project_path: PathBuf,
    },
    Xcode {
        project_path: PathBuf,
        env_name: Option<String>,
        python_version: Option<String>,
        script_only: bool,
    },
    Config(ConfigAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    Show,
    Get { key: String },
    Set { key: String, value: String },
    Reset,
}

fn project_path_arg() -> Arg {
    Arg::new("project-path")
        .long("project-path")
        .help("Path to the Xcode project directory")
        .value_parser(clap::value_parser!(PathBuf))
        .default_value(".")
}

fn env_name_arg() -> Arg {
    Arg::new("env-name")
        .long("env-name")
        .help("Name of the virtual environment (default: BuildEnv)")
        .value_parser(clap::value_parser!(String))
}

fn python_version_arg() -> Arg {
    Arg::new("python-version")
        .long("python-version")
        .help("Minimum required Python version (default: 3.6)")
        .value_parser(clap::value_parser!(String))
}

/// Builds the clap command tree
pub fn build_command() -> Command {
    let after_help = "EXAMPLES:
# Check the host and create BuildEnv in the current directory
pyenvbuilder create

# Create an environment with a custom name
pyenvbuilder create --project-path ~/Projects/App --env-name Tools

# Set up an Xcode project: environment plus setup_python_env.sh
pyenvbuilder xcode --project-path ~/Projects/App

# Delete the environment without confirmation
pyenvbuilder cleanup --project-path ~/Projects/App --force

# Install numpy into every new environment
pyenvbuilder config set requirements '[\"wheel\", \"numpy\"]'";

    Command::new("pyenvbuilder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for managing Python virtual environments in Xcode projects")
        .long_about(
            "PyEnvBuilder checks that the host can build Python environments, creates a virtual \
            environment inside a project, installs a configured package list and writes a shell \
            script that reproduces the setup for Xcode build phases.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show debug output")
                .action(ArgAction::SetTrue)
                .global(true)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only show errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a JSON configuration file")
                .long_help(
                    "Reads settings from this JSON file. If the file does not exist it is created \
                    with the default settings. Without this option the user configuration file is \
                    used when present.",
                )
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("python")
                .long("python")
                .help("Host Python interpreter used to create environments")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("create")
                .about("Run pre-installation checks and create the virtual environment")
                .arg(project_path_arg())
                .arg(env_name_arg())
                .arg(python_version_arg()),
        )
        .subcommand(
            Command::new("cleanup")
                .about("Delete a virtual environment")
                .arg(project_path_arg())
                .arg(
                    Arg::new("env-path")
                        .long("env-path")
                        .help("Environment to delete (default: <project-path>/<env_name>)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .short('f')
                        .help("Force cleanup without confirmation")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Run the pre-installation checks only")
                .arg(project_path_arg()),
        )
        .subcommand(
            Command::new("xcode")
                .about("Create the environment and the setup_python_env.sh script")
                .arg(project_path_arg())
                .arg(env_name_arg())
                .arg(python_version_arg())
                .arg(
                    Arg::new("script-only")
                        .long("script-only")
                        .help("Only write setup_python_env.sh, skipping checks and creation")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change the stored configuration")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("get")
                        .about("Print one configuration value")
                        .arg(Arg::new("KEY").required(true)),
                )
                .subcommand(
                    Command::new("set")
                        .about("Store a configuration value")
                        .arg(Arg::new("KEY").required(true))
                        .arg(
                            Arg::new("VALUE")
                                .required(true)
                                .help("JSON value, or plain text for string settings"),
                        ),
                )
                .subcommand(Command::new("reset").about("Restore the default configuration")),
        )
        .after_help(after_help)
}

/// Parses the process arguments, exiting on `--help` or invalid input
pub fn parse() -> Args {
    from_matches(&build_command().get_matches())
}

/// Parses an explicit argument list
pub fn try_parse_from<I, T>(args: I) -> std::result::Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    build_command()
        .try_get_matches_from(args)
        .map(|matches| from_matches(&matches))
}

fn project_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("project-path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn from_matches(matches: &ArgMatches) -> Args {
    let command = match matches.subcommand() {
        Some(("create", sub)) => Commands::Create {
            project_path: project_path(sub),
            env_name: string_arg(sub, "env-name"),
            python_version: string_arg(sub, "python-version"),
        },
        Some(("cleanup", sub)) => Commands::Cleanup {
            project_path: project_path(sub),
            env_path: sub.get_one::<PathBuf>("env-path").cloned(),
            force: sub.get_flag("force").then_some(true),
        },
        Some(("xcode", sub)) => Commands::Xcode {
            project_path: project_path(sub),
            env_name: string_arg(sub, "env-name"),
            python_version: string_arg(sub, "python-version"),
            script_only: sub.get_flag("script-only"),
        },
        Some(("config", sub)) => Commands::Config(match sub.subcommand() {
            Some(("get", kv)) => ConfigAction::Get {
                key: string_arg(kv, "KEY").unwrap_or_default(),
            },
            Some(("set", kv)) => ConfigAction::Set {
                key: string_arg(kv, "KEY").unwrap_or_default(),
                value: string_arg(kv, "VALUE").unwrap_or_default(),
            },
            Some(("reset", _)) => ConfigAction::Reset,
            _ => ConfigAction::Show,
        }),
        Some(("check", sub)) => Commands::Check {
            project_path: project_path(sub),
        },
        _ => Commands::Check {
            project_path: PathBuf::from("."),
        },
    };

    Args {
        command,
        config: matches.get_one::<PathBuf>("config").cloned(),
        python: matches.get_one::<PathBuf>("python").cloned(),
        verbose: matches.get_flag("verbose"),
        quiet: matches.get_flag("quiet"),
    }
}

/// Loads the configuration named by `--config`, or the user file when present
///
/// `config` subcommands bind the user file even if it does not exist yet, so
/// `config set` has somewhere to persist.
pub fn load_config(args: &Args) -> Result<Config> {
    let path = args.config.clone().or_else(|| {
        let default = default_config_path()?;
        let bind = default.exists() || matches!(args.command, Commands::Config(_));
        bind.then_some(default)
    });
    Config::load(path.as_deref())
}

/// Log filter for this run: flags first, then the configured `log_level`
///
/// An unrecognized configured level falls back to `info`; see
/// [`unknown_log_level`].
pub fn log_level(args: &Args, config: &Config) -> String {
    if args.verbose {
        return "debug".to_string();
    }
    if args.quiet {
        return "error".to_string();
    }

    configured_log_level(config)
        .and_then(parse_log_level)
        .unwrap_or(LevelFilter::Info)
        .to_string()
        .to_lowercase()
}

/// Maps a level name, in Python's or Rust's spelling, onto a log filter
pub fn parse_log_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_lowercase().as_str() {
        "notset" | "debug" => Some(LevelFilter::Debug),
        "warning" => Some(LevelFilter::Warn),
        "critical" | "fatal" => Some(LevelFilter::Error),
        other => LevelFilter::from_str(other).ok(),
    }
}

/// The configured `log_level` when it names no known level
pub fn unknown_log_level(config: &Config) -> Option<String> {
    configured_log_level(config)
        .filter(|name| parse_log_level(name).is_none())
        .map(str::to_string)
}

fn configured_log_level(config: &Config) -> Option<&str> {
    config.get("log_level").and_then(Value::as_str)
}

/// Initializes env_logger; `RUST_LOG` still takes precedence over `level`
pub fn init_logging(level: &str) {
    Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn report_checks(report: &CheckReport) {
    for result in report.results() {
        match result.status {
            CheckStatus::Passed => info!("{}", result.message),
            CheckStatus::Warning => warn!("{}", result.message),
            CheckStatus::Failed => error!("{}", result.message),
        }
    }
}

fn host_python(args: &Args) -> Result<PathBuf> {
    match &args.python {
        Some(python) => Ok(python.clone()),
        None => find_python(),
    }
}

fn apply_overrides(config: &mut Config, env_name: Option<&str>, python_version: Option<&str>) {
    if let Some(name) = env_name {
        config.override_value("env_name", Value::String(name.to_string()));
    }
    if let Some(version) = python_version {
        config.override_value("python_version", Value::String(version.to_string()));
    }
}

fn run_checks(
    config: &Config,
    runner: &dyn CommandRunner,
    python: &Path,
    project_path: &Path,
) -> Result<()> {
    let settings = config.settings()?;
    let report = Preflight::new(&settings, runner, python).run_all(project_path);
    report_checks(&report);

    if report.success() {
        Ok(())
    } else {
        Err(Error::ChecksFailed {
            failed: report.failures(),
        })
    }
}

/// Dispatches a parsed command
pub fn execute(args: &Args, config: &mut Config, runner: &dyn CommandRunner) -> Result<()> {
    match &args.command {
        Commands::Check { project_path } => {
            let python = host_python(args)?;
            run_checks(config, runner, &python, project_path)?;
            info!("All pre-installation checks passed");
        }
        Commands::Create {
            project_path,
            env_name,
            python_version,
        } => {
            apply_overrides(config, env_name.as_deref(), python_version.as_deref());
            let python = host_python(args)?;
            run_checks(config, runner, &python, project_path)?;

            let settings = config.settings()?;
            EnvironmentCreator::new(&settings, runner, python).create(project_path)?;
            info!("Successfully set up Python environment");
        }
        Commands::Xcode {
            project_path,
            env_name,
            python_version,
            script_only,
        } => {
            apply_overrides(config, env_name.as_deref(), python_version.as_deref());
            if !script_only {
                let python = host_python(args)?;
                run_checks(config, runner, &python, project_path)?;
                let settings = config.settings()?;
                EnvironmentCreator::new(&settings, runner, python).create(project_path)?;
            }

            let settings = config.settings()?;
            write_activation_script(project_path, &settings)?;
            info!("Successfully set up Python environment for Xcode project");
        }
        Commands::Cleanup {
            project_path,
            env_path,
            force,
        } => {
            let settings = config.settings()?;
            let target = env_path
                .clone()
                .unwrap_or_else(|| project_path.join(&settings.env_name));

            match EnvironmentCleaner::new(&settings).cleanup(&target, *force, &StdinConfirmation)? {
                CleanupOutcome::Removed(path) => info!("Removed {}", path.display()),
                CleanupOutcome::Cancelled => info!("Nothing was deleted"),
            }
        }
        Commands::Config(action) => execute_config(action, config)?,
    }

    Ok(())
}

fn execute_config(action: &ConfigAction, config: &mut Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let effective = Value::Object(config.effective());
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        ConfigAction::Get { key } => match config.get(key) {
            Some(Value::String(value)) => println!("{}", value),
            Some(value) => println!("{}", value),
            None => return Err(Error::General(format!("Unknown configuration key: {}", key))),
        },
        ConfigAction::Set { key, value } => {
            let parsed = config.parse_value(key, value);
            let mut candidate = config.clone();
            candidate.override_value(key.clone(), parsed.clone());
            candidate.settings()?;

            config.set(key.clone(), parsed)?;
            if let Some(path) = config.file() {
                info!("Saved {} to {}", key, path.display());
            }
        }
        ConfigAction::Reset => {
            config.reset()?;
            info!("Configuration reset to defaults");
        }
    }
    Ok(())
}
