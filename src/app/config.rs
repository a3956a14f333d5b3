use crate::page::FaultInjector;
use crate::reporter::{ReporterConfig, client};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Argument error: {0}")]
    Args(#[from] clap::Error),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Verbosity of local diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl TracingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TracingLevel::Error => "error",
            TracingLevel::Warn => "warn",
            TracingLevel::Info => "info",
            TracingLevel::Debug => "debug",
            TracingLevel::Trace => "trace",
        }
    }
}

impl From<TracingLevel> for tracing::Level {
    fn from(level: TracingLevel) -> Self {
        match level {
            TracingLevel::Error => tracing::Level::ERROR,
            TracingLevel::Warn => tracing::Level::WARN,
            TracingLevel::Info => tracing::Level::INFO,
            TracingLevel::Debug => tracing::Level::DEBUG,
            TracingLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Output format of local diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Collector base URL; events are posted to `<url>/log`
    #[arg(long, env = "COLLECTOR_URL", default_value = "http://localhost:8080")]
    pub collector_url: String,

    /// Local diagnostic log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: TracingLevel,

    /// Local diagnostic output format
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    /// Probability (0.0 to 1.0) that the user fetch fails
    #[arg(long, env = "FAULT_RATE", default_value = "0.0")]
    pub fault_rate: f64,

    /// Simulated user fetch latency in milliseconds
    #[arg(long, env = "FETCH_LATENCY_MS", default_value = "500")]
    pub fetch_latency_ms: u64,

    /// Per-request timeout for log delivery (client default when unset)
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// How long to wait for in-flight log reports on exit
    #[arg(long, env = "SHUTDOWN_GRACE_MS", default_value = "2000")]
    pub shutdown_grace_ms: u64,

    /// User agent sent to the collector
    #[arg(long, env = "USER_AGENT", default_value_t = default_user_agent())]
    pub user_agent: String,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub fetch_latency: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub shutdown_grace: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector_url: "http://localhost:8080".to_string(),
            log_level: TracingLevel::Info,
            log_format: LogFormat::Compact,
            fault_rate: 0.0,
            fetch_latency_ms: 500,
            request_timeout_secs: None,
            shutdown_grace_ms: 2000,
            user_agent: default_user_agent(),
            config_file: None,
            fetch_latency: Duration::from_millis(500),
            shutdown_grace: Duration::from_millis(2000),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Parses CLI arguments (with env fallbacks). When a config file is
    /// named, its contents replace the parsed values.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let parsed = Config::try_parse_from(args)?;

        let mut config = match parsed.config_file.clone() {
            Some(path) => Self::from_file(path)?,
            None => parsed,
        };
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)?;
        config.config_file = Some(path.as_ref().to_path_buf());
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.fetch_latency = Duration::from_millis(self.fetch_latency_ms);
        self.shutdown_grace = Duration::from_millis(self.shutdown_grace_ms);
        self.request_timeout = self.request_timeout_secs.map(Duration::from_secs);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        client::log_url(&self.collector_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid collector URL '{}': {}",
                self.collector_url, e
            ))
        })?;

        FaultInjector::new(self.fault_rate)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;

        if self.shutdown_grace_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Shutdown grace period must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0 when set".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "User agent must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig {
            collector_url: self.collector_url.clone(),
            timeout: self.request_timeout,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn fault_injector(&self) -> Result<FaultInjector, ConfigError> {
        FaultInjector::new(self.fault_rate).map_err(|e| ConfigError::InvalidConfig(e.to_string()))
    }
}

fn default_user_agent() -> String {
    format!("profile-guard/{}", env!("CARGO_PKG_VERSION"))
}
