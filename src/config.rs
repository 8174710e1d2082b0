//! # Harness Configuration
//!
//! Settings the scenario harness reads at execution time. The only value the
//! harness itself needs is the login cookie name; the session settings are carried
//! so that middleware wired into a scenario reads the same values the scenario was
//! built with.
//!
//! ## Sources
//!
//! - [`HarnessConfig::default()`]
//! - [`HarnessConfig::from_env()`]
//! - [`HarnessConfig::from_yaml_str()`] / [`HarnessConfig::from_yaml_file()`]
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `BRRTR_LOGIN_COOKIE_NAME` | `login_cookie_name` | `brrtr_session` |
//! | `BRRTR_TOKEN_ROTATION_MINUTES` | `token_rotation_interval_minutes` | `10` |
//! | `BRRTR_LOGIN_MAX_LIFETIME_DAYS` | `login_max_lifetime_days` | `30` |
//! | `BRRTR_LOG_LEVEL` | `log_level` | `info` |
//!
//! ## YAML
//!
//! ```yaml
//! login_cookie_name: my_session
//! token_rotation_interval_minutes: 5
//! ```
//!
//! Missing keys fall back to their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LOGIN_COOKIE_NAME: &str = "brrtr_session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Cookie name the session token is attached under
    pub login_cookie_name: String,
    /// How often a session middleware should rotate tokens
    pub token_rotation_interval_minutes: u64,
    /// Maximum lifetime of a login session
    pub login_max_lifetime_days: u64,
    /// Default level for test logging when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            login_cookie_name: DEFAULT_LOGIN_COOKIE_NAME.to_string(),
            token_rotation_interval_minutes: 10,
            login_max_lifetime_days: 30,
            log_level: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            login_cookie_name: env::var("BRRTR_LOGIN_COOKIE_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.login_cookie_name),
            token_rotation_interval_minutes: env::var("BRRTR_TOKEN_ROTATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_rotation_interval_minutes),
            login_max_lifetime_days: env::var("BRRTR_LOGIN_MAX_LIFETIME_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.login_max_lifetime_days),
            log_level: env::var("BRRTR_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse harness config")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read harness config {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    /// Override the login cookie name.
    #[must_use]
    pub fn login_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.login_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn token_rotation_interval(&self) -> Duration {
        Duration::from_secs(self.token_rotation_interval_minutes.saturating_mul(60))
    }

    #[must_use]
    pub fn login_max_lifetime(&self) -> Duration {
        Duration::from_secs(self.login_max_lifetime_days.saturating_mul(24 * 60 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.login_cookie_name, "brrtr_session");
        assert_eq!(cfg.token_rotation_interval(), Duration::from_secs(600));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = HarnessConfig::from_yaml_str("login_cookie_name: grafana_session\n").unwrap();
        assert_eq!(cfg.login_cookie_name, "grafana_session");
        assert_eq!(cfg.login_max_lifetime_days, 30);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let cfg = HarnessConfig::from_yaml_str(
            "login_max_lifetime_days: 18446744073709551615\ntoken_rotation_interval_minutes: 18446744073709551615\n",
        )
        .unwrap();
        assert_eq!(cfg.login_max_lifetime(), Duration::from_secs(u64::MAX));
        assert_eq!(cfg.token_rotation_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token_rotation_interval_minutes: 1").unwrap();
        let cfg = HarnessConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.token_rotation_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = HarnessConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var("BRRTR_LOGIN_COOKIE_NAME", "env_session");
        env::set_var("BRRTR_TOKEN_ROTATION_MINUTES", "bogus");
        let cfg = HarnessConfig::from_env();
        env::remove_var("BRRTR_LOGIN_COOKIE_NAME");
        env::remove_var("BRRTR_TOKEN_ROTATION_MINUTES");
        assert_eq!(cfg.login_cookie_name, "env_session");
        assert_eq!(cfg.token_rotation_interval_minutes, 10);
    }
}
