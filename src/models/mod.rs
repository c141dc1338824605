pub mod check;
pub mod environment;

pub use check::{CheckReport, CheckResult, CheckStatus, SUCCESS_MARKER, WARNING_MARKER};
pub use environment::{PYVENV_CFG, PlatformLayout, VirtualEnv};
