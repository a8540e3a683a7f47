//! Application configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::position::Backoff;
use crate::relay::RelaySettings;
use crate::tenant::{TenantConfig, TenantRegistry};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ui: UiConfig,
    pub relay: RelayConfig,
    pub console: ConsoleConfig,
    /// Tenants created at startup
    pub tenants: BTreeMap<String, TenantConfig>,
}

/// Web server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub bind_address: String,
    pub http_port: u16,
    /// Directory served for every path the API does not claim
    pub assets_dir: PathBuf,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: DEFAULT_HTTP_PORT,
            assets_dir: PathBuf::from("./assets"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Shared tick of the synchronizer and gain broadcast
    pub update_interval_ms: u64,
    /// Relay and broadcast regardless of entity existence
    pub debug: bool,
    /// Frames buffered per session before dropping
    pub outbound_queue: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            debug: false,
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Login retry delay grows by this much per consecutive failure
    pub backoff_unit_secs: u64,
    /// Bound on every console read, write and connect
    pub io_timeout_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backoff_unit_secs: DEFAULT_BACKOFF_UNIT_SECS,
            io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        tracing::info!(path = %path.display(), tenants = config.tenants.len(), "Loaded configuration");
        Ok(config)
    }

    /// Load from an explicit path if given, else from the platform config dir
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self> {
        match explicit.or_else(default_path) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.relay.update_interval_ms == 0 {
            return Err(Error::Config("relay.update_interval_ms must be positive".into()));
        }
        if self.relay.outbound_queue == 0 {
            return Err(Error::Config("relay.outbound_queue must be positive".into()));
        }
        if self.console.io_timeout_ms == 0 {
            return Err(Error::Config("console.io_timeout_ms must be positive".into()));
        }
        for (name, tenant) in &self.tenants {
            tenant
                .validate()
                .map_err(|e| Error::Config(format!("tenants.{}: {}", name, e)))?;
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.relay.update_interval_ms)
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            update_interval: self.update_interval(),
            debug: self.relay.debug,
            outbound_queue: self.relay.outbound_queue,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(Duration::from_secs(self.console.backoff_unit_secs))
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.console.io_timeout_ms)
    }

    /// Create every configured tenant in `registry`
    pub fn seed(&self, registry: &TenantRegistry) -> Result<()> {
        for (name, tenant) in &self.tenants {
            registry.create(name, tenant.clone())?;
            tracing::info!(tenant = %name, "Tenant loaded from config");
        }
        Ok(())
    }
}

/// `config.toml` in the platform config directory
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", env!("CARGO_PKG_NAME")).map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ui.http_port, 1031);
        assert_eq!(config.update_interval(), Duration::from_secs(1));
        assert_eq!(config.backoff().unit(), Duration::from_secs(5));
        assert!(!config.relay_settings().debug);
    }

    #[test]
    fn test_parse_full() {
        let config = AppConfig::from_toml(
            r#"
            [ui]
            http_port = 8080

            [relay]
            update_interval_ms = 250
            debug = true

            [console]
            backoff_unit_secs = 2

            [tenants.alpha]
            address = "localhost:25575"
            pass = "0000"

            [tenants.beta]
            address = "10.0.0.2:25575"
            password = "hunter2"
            fadeout = 5.0
            mute = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.ui.http_port, 8080);
        assert_eq!(config.ui.bind_address, "0.0.0.0");
        assert_eq!(config.relay_settings().update_interval, Duration::from_millis(250));
        assert!(config.relay.debug);
        assert_eq!(config.relay.outbound_queue, DEFAULT_OUTBOUND_QUEUE);
        assert_eq!(config.backoff().delay(3), Duration::from_secs(6));

        let alpha = &config.tenants["alpha"];
        assert_eq!(alpha.password, "0000");
        assert_eq!(alpha.fadeout, DEFAULT_FADEOUT);
        assert_eq!(config.tenants["beta"].password, "hunter2");
        assert_eq!(config.tenants["beta"].mute, 30.0);
    }

    #[test]
    fn test_validation() {
        assert!(AppConfig::from_toml("[relay]\nupdate_interval_ms = 0").is_err());
        assert!(AppConfig::from_toml("[relay]\noutbound_queue = 0").is_err());
        assert!(AppConfig::from_toml("[console]\nio_timeout_ms = 0").is_err());
        assert!(AppConfig::from_toml("[console]\nbackoff_unit_secs = 0").is_ok());
        assert!(AppConfig::from_toml("[tenants.a]\nfadeout = -1.0").is_err());
        assert!(AppConfig::from_toml("[ui]\nhttp_port = \"x\"").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/relay/config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_seed() {
        let config = AppConfig::from_toml("[tenants.alpha]\naddress = \"a\"\npass = \"b\"").unwrap();
        let registry = TenantRegistry::new();
        config.seed(&registry).unwrap();
        assert!(registry.resolve("alpha").is_some());
        assert!(config.seed(&registry).is_err());
    }
}
