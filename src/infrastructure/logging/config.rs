//! The `logging` section of the runtime settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::rolling::{self, RollingFileAppender};

const DEFAULT_FILE_NAME: &str = "issue-shepherd.log";

/// Where the bot writes its traces and at which verbosity.
///
/// Console traces always go to stderr. A rolling JSON file is added when
/// `log_dir` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter level. `RUST_LOG` directives take precedence.
    pub level: String,
    pub format: LogFormat,
    pub log_dir: Option<PathBuf>,
    /// File name prefix inside `log_dir`; rotation appends the period.
    pub file_name: String,
    pub rotation: RotationPolicy,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            log_dir: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            rotation: RotationPolicy::Daily,
        }
    }
}

impl LogConfig {
    /// The configured level, or `None` when it is not a tracing level name.
    pub fn default_level(&self) -> Option<Level> {
        match self.level.to_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }

    /// Rolling appender for `log_dir`, if file output is enabled.
    pub fn file_appender(&self) -> Option<RollingFileAppender> {
        self.log_dir
            .as_deref()
            .map(|dir| self.rotation.appender(dir, &self.file_name))
    }
}

/// Console line format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    Json,
    /// Multi-line human output for local runs.
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl RotationPolicy {
    fn appender(self, dir: &Path, file_name: &str) -> RollingFileAppender {
        match self {
            Self::Daily => rolling::daily(dir, file_name),
            Self::Hourly => rolling::hourly(dir, file_name),
            Self::Never => rolling::never(dir, file_name),
        }
    }
}
