use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use super::loader::ConfigError;
use crate::adapters::github::GITHUB_API_BASE;
use crate::infrastructure::logging::LogConfig;

/// Runtime settings of the bot process.
///
/// Precedence (lowest to highest):
/// 1. Programmatic defaults (Serialized)
/// 2. The `--settings` YAML file, when given
/// 3. Environment variables (`SHEPHERD_*` prefix, `__` separates sections)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub github: GitHubSettings,
    #[serde(default)]
    pub throttle: ThrottleSettings,
    #[serde(default)]
    pub admission: AdmissionSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubSettings {
    pub api_base: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
        }
    }
}

/// Pacing of the remote calls issued by sync, init, destroy and jobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThrottleSettings {
    /// Calls that may go out back to back.
    pub burst: u32,
    /// One token is refilled per interval.
    pub interval_ms: u64,
    /// Concurrent mutation workers in one dispatch round.
    pub max_workers: usize,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            burst: 5,
            interval_ms: 500,
            max_workers: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdmissionSettings {
    /// How long sync and init wait for the admission slot before reporting busy.
    pub wait_secs: u64,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self { wait_secs: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthSettings {
    /// Accepted clock skew of control endpoint tokens.
    pub max_skew_secs: u64,
    /// Enables `X-Hub-Signature-256` verification of webhooks.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            max_skew_secs: 10,
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncSettings {
    /// Comment on assigned issues whose tracked files changed.
    pub notify_assignees: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            notify_assignees: true,
        }
    }
}

impl Settings {
    /// Load settings, optionally layering a YAML file over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "settings file not found"),
                });
            }
            figment = figment.merge(Yaml::file(path));
        }
        let settings: Self = figment
            .merge(Env::prefixed("SHEPHERD_").split("__"))
            .extract()
            .map_err(Box::new)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.default_level().is_none() {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }
        if self.throttle.burst == 0 {
            return Err(ConfigError::ValidationFailed(
                "throttle.burst must be at least 1".to_string(),
            ));
        }
        if self.throttle.interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "throttle.interval_ms must be positive".to_string(),
            ));
        }
        if self.throttle.max_workers == 0 {
            return Err(ConfigError::ValidationFailed(
                "throttle.max_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle.interval_ms)
    }

    pub const fn admission_wait(&self) -> Duration {
        Duration::from_secs(self.admission.wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.throttle.burst, 5);
        assert_eq!(settings.throttle_interval(), Duration::from_millis(500));
        assert_eq!(settings.admission_wait(), Duration::from_secs(5));
        assert_eq!(settings.auth.max_skew_secs, 10);
        assert!(settings.auth.webhook_secret.is_none());
        settings.validate().expect("default settings should be valid");
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 9000\nthrottle:\n  burst: 2\nlogging:\n  level: debug\n  format: pretty"
        )
        .unwrap();
        file.flush().unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1", "unset fields keep defaults");
        assert_eq!(settings.throttle.burst, 2);
        assert_eq!(settings.throttle.interval_ms, 500);
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_layer_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000\nsync:\n  notify_assignees: true").unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("SHEPHERD_SERVER__PORT", Some("9100")),
                ("SHEPHERD_AUTH__WEBHOOK_SECRET", Some("s3cret")),
                ("SHEPHERD_SYNC__NOTIFY_ASSIGNEES", Some("false")),
            ],
            || {
                let settings = Settings::load(Some(file.path())).unwrap();
                assert_eq!(settings.server.port, 9100);
                assert_eq!(settings.auth.webhook_secret.as_deref(), Some("s3cret"));
                assert!(!settings.sync.notify_assignees);
            },
        );
    }

    #[test]
    fn test_env_value_failing_validation() {
        temp_env::with_var("SHEPHERD_THROTTLE__MAX_WORKERS", Some("0"), || {
            assert!(matches!(
                Settings::load(None),
                Err(ConfigError::ValidationFailed(msg)) if msg.contains("max_workers")
            ));
        });
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/shepherd.yaml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let mut settings = Settings::default();
        settings.throttle.burst = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "chatty".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidLogLevel(level)) if level == "chatty"
        ));
    }
}
