use crate::error::Result;
use crate::signal::Signal;
use config::{Config, ConfigError, Environment, Map};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

/// Runtime settings, read from `RUNAPP_*` environment variables.
///
/// Nested keys use a double underscore, e.g. `RUNAPP_SIGNAL__TIMEOUT_MS=500`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RunappConfig {
    pub signal: SignalConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SignalConfig {
    /// How long each escalation step waits for delivery, in milliseconds
    #[serde(default = "default_signal_timeout_ms")]
    pub timeout_ms: u64,

    /// Signals tried after the one received from the environment
    #[serde(default = "default_fallback_signals")]
    pub fallback: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
    Json,
}

impl RunappConfig {
    /// Load configuration from defaults and the process environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_with_env(None)
    }

    /// Load configuration, reading variables from `env` instead of the process
    /// environment when given.
    pub fn load_with_env(
        env: Option<Map<String, String>>,
    ) -> std::result::Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("signal.timeout_ms", default_signal_timeout_ms() as i64)?
            .set_default("signal.fallback", default_fallback_signals())?
            .set_default("log.level", default_log_level())?
            .set_default("log.format", "full")?
            .add_source(
                Environment::with_prefix("RUNAPP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("signal.fallback")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: RunappConfig = settings.try_deserialize()?;
        debug!("Final configuration: {:?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.signal.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Signal timeout_ms must be greater than 0".to_string(),
            ));
        }

        let fallback = self
            .fallback_signals()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        if fallback.contains(&Signal::KILL) {
            return Err(ConfigError::Message(
                "SIGKILL cannot be a fallback signal; it is always the final step".to_string(),
            ));
        }

        if self.log.level.parse::<LevelFilter>().is_err() {
            return Err(ConfigError::Message(format!(
                "Unknown log level '{}'",
                self.log.level
            )));
        }

        Ok(())
    }

    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.signal.timeout_ms)
    }

    /// Parse the configured fallback signal names
    pub fn fallback_signals(&self) -> Result<Vec<Signal>> {
        self.signal
            .fallback
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.parse())
            .collect()
    }
}

impl Default for RunappConfig {
    fn default() -> Self {
        Self {
            signal: SignalConfig {
                timeout_ms: default_signal_timeout_ms(),
                fallback: default_fallback_signals(),
            },
            log: LogConfig {
                level: default_log_level(),
                format: LogFormat::default(),
            },
        }
    }
}

// Default value functions
fn default_signal_timeout_ms() -> u64 {
    2000
}
fn default_fallback_signals() -> Vec<String> {
    vec!["TERM".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}
