// Declare modules for the library build
pub mod checks;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod models;
pub mod utils;

pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use models::{CheckReport, CheckResult, CheckStatus, PlatformLayout, VirtualEnv};

use std::ffi::OsString;

/// Runs the CLI with an explicit argument list, without touching the logger
///
/// Returns the process exit code: 0 on success, 1 on any failure.
pub fn run_main_with_args<I, T>(args: I, runner: &dyn utils::CommandRunner) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let result = cli::try_parse_from(args)
        .map_err(|e| Error::General(e.to_string()))
        .and_then(|args| {
            let mut config = cli::load_config(&args)?;
            cli::execute(&args, &mut config, runner)
        });

    match result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("Error: {}", e);
            1
        }
    }
}
