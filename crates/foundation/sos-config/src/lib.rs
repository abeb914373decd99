//! SOS configuration
//!
//! YAML file at `~/.config/sos-alert/config.yaml` (or `$SOS_CONFIG`), every
//! field optional. Environment overrides are applied after the file.

use serde::{Deserialize, Serialize};
use sos_core::Permission;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "sos-alert";

pub const ENV_CONFIG_PATH: &str = "SOS_CONFIG";
pub const ENV_WEBHOOK_URL: &str = "SOS_WEBHOOK_URL";
pub const ENV_STORE_PATH: &str = "SOS_STORE_PATH";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SosConfig {
    pub storage: StorageConfig,
    pub dispatch: DispatchConfig,
    pub sms: SmsConfig,
    pub location: LocationConfig,
    pub permissions: PermissionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON key-value file. Defaults to the platform data dir.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub location_timeout_ms: u64,
    pub watchdog_ms: u64,
    pub sms_channel: u8,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            location_timeout_ms: 10_000,
            watchdog_ms: 5_000,
            sms_channel: 1,
        }
    }
}

impl DispatchConfig {
    pub fn location_timeout(&self) -> Duration {
        Duration::from_millis(self.location_timeout_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmsMode {
    /// Log the message and report a synthetic receipt.
    #[default]
    DryRun,
    /// POST to an HTTP SMS gateway.
    Webhook,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SmsConfig {
    pub mode: SmsMode,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub high_accuracy: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            high_accuracy: true,
        }
    }
}

impl LocationConfig {
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionModel {
    /// Ask the permission capability before every dispatch.
    #[default]
    Runtime,
    /// Platform has no runtime permissions; the gate always passes.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionConfig {
    pub model: PermissionModel,
    /// Permissions the static provider reports as granted.
    pub granted: Vec<Permission>,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            model: PermissionModel::Runtime,
            granted: Permission::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log file for the TUI.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl SosConfig {
    /// `$SOS_CONFIG`, else `<config_dir>/sos-alert/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.yaml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, apply env overrides and validate.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write as YAML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_yaml()?).map_err(io_err)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            self.sms.webhook_url = Some(url);
            self.sms.mode = SmsMode::Webhook;
        }
        if let Ok(path) = std::env::var(ENV_STORE_PATH) {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dispatch.watchdog_ms == 0 {
            return Err(ConfigError::Invalid("dispatch.watchdog_ms must be > 0".into()));
        }
        if self.dispatch.location_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.location_timeout_ms must be > 0".into(),
            ));
        }
        if self.dispatch.watchdog_ms >= self.dispatch.location_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "dispatch.watchdog_ms ({}) must be shorter than dispatch.location_timeout_ms ({})",
                self.dispatch.watchdog_ms, self.dispatch.location_timeout_ms
            )));
        }
        if self.sms.mode == SmsMode::Webhook {
            let raw = self
                .sms
                .webhook_url
                .as_deref()
                .ok_or_else(|| ConfigError::Invalid("sms.webhook_url is required in webhook mode".into()))?;
            url::Url::parse(raw)
                .map_err(|e| ConfigError::Invalid(format!("sms.webhook_url: {}", e)))?;
        }
        if self.location.latitude.is_some() != self.location.longitude.is_some() {
            return Err(ConfigError::Invalid(
                "location.latitude and location.longitude must be set together".into(),
            ));
        }
        Ok(())
    }

    /// Key-value store file, falling back to `<data_dir>/sos-alert/store.json`.
    pub fn store_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("store.json")
        })
    }

    /// TUI log file, falling back to `<data_dir>/sos-alert/sos-tui.log`.
    pub fn log_path(&self) -> PathBuf {
        self.logging.file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("sos-tui.log")
        })
    }
}
