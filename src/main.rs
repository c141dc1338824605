use log::{error, warn};
use pyenvbuilder::cli;
use pyenvbuilder::utils::SystemRunner;
use std::process::exit;

fn main() {
    let args = cli::parse();

    let mut config = match cli::load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the config file, so it is not up yet
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    cli::init_logging(&cli::log_level(&args, &config));
    if let Some(level) = cli::unknown_log_level(&config) {
        warn!("Unknown log_level {:?} in configuration, using INFO", level);
    }

    if let Err(e) = cli::execute(&args, &mut config, &SystemRunner) {
        error!("Error: {}", e);
        exit(1);
    }
}
