pub mod cleanup;
pub mod create;
pub mod script;

pub use cleanup::{CleanupOutcome, EnvironmentCleaner, active_environment, is_valid_venv};
pub use create::{EnvironmentCreator, REQUIREMENTS_FILE, resolve_project_dir};
pub use script::{SCRIPT_NAME, render_activation_script, write_activation_script};
