// Runtime configuration with layered sources (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all runtime options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub monitors: MonitorSourceConfig,
    pub http: HttpConfig,
    pub scheduler: SchedulerConfig,
    pub observability: ObservabilityConfig,
}

/// Where the monitor configuration document lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSourceConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Default ceiling for one poll cycle's request timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub shutdown_grace_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_port: u16,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Local overrides, not committed to git
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate runtime settings before anything starts
    pub fn validate(&self) -> Result<(), String> {
        if self.monitors.path.is_empty() {
            return Err("Monitor configuration path cannot be empty".to_string());
        }

        if self.http.timeout_seconds == 0 {
            return Err("HTTP timeout_seconds must be greater than 0".to_string());
        }

        if self.observability.log_level.is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        if self.observability.metrics_port == 0 {
            return Err("Metrics port must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            monitors: MonitorSourceConfig {
                path: "config/monitors.json".to_string(),
            },
            http: HttpConfig {
                timeout_seconds: 30,
            },
            scheduler: SchedulerConfig {
                shutdown_grace_seconds: 5,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                metrics_port: 9090,
            },
        }
    }
}
