//! Logging initialisation.
//!
//! Scenarios log which credentials they attach and what the router dispatched. Run
//! tests with `RUST_LOG=brrtrouter_testkit=debug` to see them.

use crate::config::HarnessConfig;
use anyhow::{anyhow, Result};
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log format: JSON for CI log collection, pretty-print for local runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Parse configuration from `BRRTR_LOG_LEVEL` and `BRRTR_LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("BRRTR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("BRRTR_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            ),
        }
    }

    /// Level from a [`HarnessConfig`], format from `BRRTR_LOG_FORMAT`.
    pub fn from_harness(config: &HarnessConfig) -> Self {
        Self {
            log_level: config.log_level.clone(),
            format: LogFormat::parse(
                &env::var("BRRTR_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            ),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level().as_str()))
    }
}

/// Install a global subscriber writing to stdout.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };
    result.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

impl From<&HarnessConfig> for LogConfig {
    fn from(config: &HarnessConfig) -> Self {
        Self::from_harness(config)
    }
}

static TEST_LOGGING: Once = Once::new();

/// Install a subscriber that writes through the libtest capture, once per process.
///
/// Safe to call from every test; later calls are no-ops, as is the first call when
/// another global subscriber already exists.
pub fn init_test_logging() {
    init_test_logging_with(&LogConfig::from_env());
}

/// [`init_test_logging`] with an explicit level; only the first call in a process counts.
pub fn init_test_logging_with(config: &LogConfig) {
    TEST_LOGGING.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
        if installed.is_err() {
            tracing::debug!("test logging: subscriber already installed");
        }
    });
}
