use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitoring::validation;
use crate::monitoring::ServiceId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file: {0}")]
    ReadFailed(std::io::Error),
    #[error("failed to write config file: {0}")]
    WriteFailed(std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseFailed(String),
    #[error("no config path available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub xroad: XRoad,
    pub collector: Collector,
    pub alerts: Alerts,
    pub database: DatabaseConfig,
    pub services: Vec<ServiceEntry>,
}

/// Connection details for the Security Server the agent probes through
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XRoad {
    /// Base URL of the Security Server REST gateway
    pub server: String,
    /// Value sent as the `X-Road-Client` header on every probe
    pub client: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Collector {
    /// Default seconds between checks of the same service
    pub interval_seconds: u64,
    /// Probe timeout in seconds
    pub timeout_seconds: u64,
    /// Responses slower than this are classified SLOW
    pub slow_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerts {
    /// Consecutive DOWN results before a ServiceDown alert is raised
    pub failure_threshold: u32,
    /// Send a notification when a service comes back UP
    pub notify_recovery: bool,
    /// Optional webhook receiving alert payloads as JSON
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the LibSQL database file
    pub path: String,
    /// Days of check history to keep
    pub retention_days: i64,
    /// Days resolved alerts are kept before pruning
    pub resolved_alert_retention_days: i64,
}

/// One monitored service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// X-Road subsystem identifier, e.g. `GOV/12345678/TestSystem`
    pub subsystem: String,
    /// Service code invoked on the subsystem
    pub service: String,
    /// Per-service override of the collector interval
    #[serde(default)]
    pub interval_seconds: Option<u64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ServiceEntry {
    pub fn id(&self) -> ServiceId {
        ServiceId::new(self.subsystem.clone(), self.service.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            xroad: XRoad::default(),
            collector: Collector::default(),
            alerts: Alerts::default(),
            database: DatabaseConfig::default(),
            services: vec![ServiceEntry {
                subsystem: "GOV/12345678/TestSystem".into(),
                service: "testService".into(),
                interval_seconds: None,
                enabled: true,
            }],
        }
    }
}

impl Default for XRoad {
    fn default() -> Self {
        Self {
            server: "http://localhost:8080".into(),
            client: "DEV/12345678/MonitoringAgent".into(),
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self { interval_seconds: 60, timeout_seconds: 10, slow_threshold_ms: 3000 }
    }
}

impl Default for Alerts {
    fn default() -> Self {
        Self { failure_threshold: 3, notify_recovery: true, webhook_url: None }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "xroad_monitoring.db".into(),
            retention_days: 30,
            resolved_alert_retention_days: 7,
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/xrmon/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Ok(home_dir) = env::var("HOME") {
        path::PathBuf::from(home_dir).join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("xrmon/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Internal Configuration State:")?;
        writeln!(f, "  X-Road")?;
        writeln!(f, "    Security Server: {}", self.xroad.server)?;
        writeln!(f, "    Client Header:   {}", self.xroad.client)?;
        writeln!(f, "  Collector")?;
        writeln!(f, "    Interval:        {}s", self.collector.interval_seconds)?;
        writeln!(f, "    Timeout:         {}s", self.collector.timeout_seconds)?;
        writeln!(f, "    Slow Threshold:  {}ms", self.collector.slow_threshold_ms)?;
        writeln!(f, "  Alerts")?;
        writeln!(f, "    Failure Threshold: {}", self.alerts.failure_threshold)?;
        writeln!(f, "    Notify Recovery:   {}", self.alerts.notify_recovery)?;
        writeln!(
            f,
            "    Webhook:           {}",
            self.alerts.webhook_url.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "  Database")?;
        writeln!(f, "    Path:            {}", self.database.path)?;
        writeln!(f, "    Retention:       {}d", self.database.retention_days)?;
        writeln!(f, "  Services ({})", self.services.len())?;
        for entry in &self.services {
            let interval =
                entry.interval_seconds.unwrap_or(self.collector.interval_seconds);
            writeln!(
                f,
                "    {} every {}s{}",
                entry.id(),
                interval,
                if entry.enabled { "" } else { " (disabled)" }
            )?;
        }

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/xrmon/config.toml
    /// or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(Error::ReadFailed)?;
            toml::from_str(raw_string.as_str())
                .map_err(|err| Error::ParseFailed(err.to_string()))?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|err| Error::ParseFailed(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::WriteFailed)?;
        }

        std::fs::write(path, config_str).map_err(Error::WriteFailed)
    }

    /// Reject configurations that would produce meaningless monitors
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |e: anyhow::Error| Error::Invalid(e.to_string());

        validation::validate_server_url(&self.xroad.server).map_err(invalid)?;
        validation::validate_check_interval(self.collector.interval_seconds).map_err(invalid)?;
        validation::validate_timeout(self.collector.timeout_seconds).map_err(invalid)?;

        for entry in &self.services {
            validation::validate_subsystem(&entry.subsystem).map_err(invalid)?;
            validation::validate_service_code(&entry.service).map_err(invalid)?;
            if let Some(interval) = entry.interval_seconds {
                validation::validate_check_interval(interval).map_err(invalid)?;
            }
        }

        Ok(())
    }

    /// Effective check interval for a service entry
    pub fn interval_for(&self, entry: &ServiceEntry) -> u64 {
        entry.interval_seconds.unwrap_or(self.collector.interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();

        assert_eq!(parsed.xroad.server, config.xroad.server);
        assert_eq!(parsed.collector.slow_threshold_ms, 3000);
        assert_eq!(parsed.services.len(), 1);
        assert!(parsed.services[0].enabled);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::from_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.collector.interval_seconds, 60);

        // Second load reads back the created file
        let reread = Config::from_config(Some(&path)).unwrap();
        assert_eq!(reread.database.retention_days, 30);
    }

    #[test]
    fn non_toml_extension_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        Config::from_config(Some(&path)).unwrap();
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let raw = r#"
            [collector]
            interval_seconds = 30

            [[services]]
            subsystem = "DEV/GOV/1234/Registry"
            service = "getRecord"
        "#;
        let config: Config = toml::from_str(raw).unwrap();

        assert_eq!(config.collector.interval_seconds, 30);
        assert_eq!(config.collector.timeout_seconds, 10);
        assert_eq!(config.alerts.failure_threshold, 3);
        assert_eq!(config.services[0].service, "getRecord");
    }

    #[test]
    fn invalid_subsystem_is_rejected() {
        let mut config = Config::default();
        config.services[0].subsystem = "not-an-identifier".into();

        assert!(matches!(config.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn invalid_interval_override_is_rejected() {
        let mut config = Config::default();
        config.services[0].interval_seconds = Some(1);

        assert!(config.validate().is_err());
    }
}
