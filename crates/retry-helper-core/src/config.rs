use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Fixed wait in seconds after a qualifying failure (e.g. 0.25 = 250ms).
    pub wait_seconds: f64,
    /// Exit codes that qualify for a retry when running a command. Empty = any failure.
    #[serde(default)]
    pub retry_on_exit_codes: Vec<i32>,
}

impl Default for RetryConfig {
    /// Library profile: a single attempt, no wait.
    fn default() -> Self {
        Self {
            max_attempts: 1,
            wait_seconds: 0.0,
            retry_on_exit_codes: Vec::new(),
        }
    }
}

impl RetryConfig {
    /// Profile used by the command runner: three attempts, five seconds apart.
    pub fn command_profile() -> Self {
        Self {
            max_attempts: 3,
            wait_seconds: 5.0,
            retry_on_exit_codes: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !self.wait_seconds.is_finite() || self.wait_seconds < 0.0 {
            return Err(ConfigError::InvalidWait(self.wait_seconds));
        }
        Ok(())
    }
}

/// Invalid values in a loaded config file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("retry.wait_seconds must be a finite, non-negative number (got {0})")]
    InvalidWait(f64),
}

/// Global configuration loaded from `~/.config/retry-helper/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    #[serde(default = "RetryConfig::command_profile")]
    pub retry: RetryConfig,
    /// Shell command run (via `sh -c`) before every re-attempt.
    #[serde(default)]
    pub reset_command: Option<String>,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::command_profile(),
            reset_command: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("retry-helper")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HelperConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HelperConfig::default();
        write_to(&path, &default_cfg)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Read and validate a config file at an explicit path.
pub fn load_from(path: &Path) -> Result<HelperConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: HelperConfig = toml::from_str(&data)?;
    cfg.retry.validate()?;
    Ok(cfg)
}

pub fn write_to(path: &Path, cfg: &HelperConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles() {
        let lib = RetryConfig::default();
        assert_eq!(lib.max_attempts, 1);
        assert_eq!(lib.wait_seconds, 0.0);
        let cmd = HelperConfig::default().retry;
        assert_eq!(cmd.max_attempts, 3);
        assert_eq!(cmd.wait_seconds, 5.0);
        assert!(cmd.retry_on_exit_codes.is_empty());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = HelperConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: HelperConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            reset_command = "rm -f /tmp/partial"

            [retry]
            max_attempts = 10
            wait_seconds = 0.5
            retry_on_exit_codes = [1, 75]
        "#;
        let cfg: HelperConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.retry.max_attempts, 10);
        assert!((cfg.retry.wait_seconds - 0.5).abs() < 1e-9);
        assert_eq!(cfg.retry.retry_on_exit_codes, vec![1, 75]);
        assert_eq!(cfg.reset_command.as_deref(), Some("rm -f /tmp/partial"));
    }

    #[test]
    fn missing_retry_section_uses_command_profile() {
        let cfg: HelperConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.retry, RetryConfig::command_profile());
        assert!(cfg.reset_command.is_none());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = RetryConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.max_attempts = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroAttempts));
        cfg.max_attempts = 2;
        cfg.wait_seconds = -1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidWait(_))));
    }

    #[test]
    fn load_from_file_and_reject_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_to(&path, &HelperConfig::default()).unwrap();
        assert_eq!(load_from(&path).unwrap(), HelperConfig::default());

        std::fs::write(&path, "[retry]\nmax_attempts = 0\nwait_seconds = 1.0\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }
}
