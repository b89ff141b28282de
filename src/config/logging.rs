//! Logging configuration

use std::path::PathBuf;

use serde::Deserialize;

use super::server::Environment;

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable pretty format for development.
    Pretty,
    /// JSON format for log aggregation.
    Json,
}

impl LogFormat {
    /// Format used when none is configured.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => LogFormat::Pretty,
            Environment::Staging | Environment::Production => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Explicit output format; derived from the environment when unset
    #[serde(default)]
    pub format: Option<LogFormat>,

    /// Directory for `app-YYYY-MM-DD.log`; logs go to stderr when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolve the output format for an environment.
    pub fn format_for(&self, environment: Environment) -> LogFormat {
        self.format
            .unwrap_or_else(|| LogFormat::for_environment(environment))
    }
}
