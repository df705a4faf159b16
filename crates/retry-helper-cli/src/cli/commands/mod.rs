//! CLI command handlers. Each command is in its own file.

mod completions;
mod run;
mod show_config;

pub use completions::run_completions;
pub use run::{run_command, RunSettings};
pub use show_config::run_show_config;
