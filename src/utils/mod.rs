pub mod command;
pub mod prompt;
pub mod python;

pub use command::{CommandRunner, SystemRunner, ToolCommand, ToolOutput};
pub use prompt::{Confirmation, StdinConfirmation};
pub use python::{find_python, parse_dotted_version, parse_interpreter_version};
