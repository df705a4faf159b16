//! Config command: where the config lives and what it currently says.

use anyhow::Result;
use retry_helper_core::config::HelperConfig;
use std::path::Path;

pub fn run_show_config(path: &Path, cfg: &HelperConfig) -> Result<()> {
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
