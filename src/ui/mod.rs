//! CLI output helpers
//!
//! Plain console-styled output with an install progress bar. Everything
//! degrades to plain lines when stderr is not a terminal, so CI logs stay
//! readable.

mod output;
mod progress;

pub use output::{format_bytes, key_value, step_error, step_info, step_ok, step_warn};
pub use progress::InstallProgress;
