//! Configuration management with versioning and migration

use crate::error::{Result, TrayError};
use crate::shell::types::WM_APP;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current configuration version
pub const CONFIG_VERSION: u32 = 1;

/// Configuration filename
const CONFIG_FILENAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration version for migration
    #[serde(default = "default_version")]
    pub config_version: u32,

    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Tray icon settings
    #[serde(default)]
    pub tray: TrayConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Language override (None = use system locale, Some = use specified locale)
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrayConfig {
    /// Passed through to the controller; has no visible effect
    #[serde(default)]
    pub title: Option<String>,

    /// Icon file, relative paths resolve against the config directory
    #[serde(default = "default_icon_path")]
    pub icon_path: String,

    /// Tooltip override (None = localized default)
    #[serde(default)]
    pub tooltip: Option<String>,

    /// Callback message id as an offset from WM_APP
    #[serde(default = "default_callback_offset")]
    pub callback_offset: u32,
}

fn default_icon_path() -> String {
    "resources/tray.ico".to_string()
}

fn default_callback_offset() -> u32 {
    1
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            title: None,
            icon_path: default_icon_path(),
            tooltip: None,
            callback_offset: default_callback_offset(),
        }
    }
}

impl TrayConfig {
    /// Callback message id, kept inside the WM_APP range
    pub fn callback_message(&self) -> u32 {
        WM_APP + self.callback_offset.min(0x3FFF)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum log file size in bytes
    #[serde(default = "default_max_log_size")]
    pub max_file_size: u64,

    /// Number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_log_files() -> u32 {
    3
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_file_size: default_max_log_size(),
            max_files: default_max_log_files(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            general: GeneralConfig::default(),
            tray: TrayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Migrate config from older version
    fn migrate(&mut self) {
        if self.config_version < CONFIG_VERSION {
            info!(
                "Migrating config from version {} to {}",
                self.config_version, CONFIG_VERSION
            );
            // v0 configs predate versioning; missing fields take serde defaults
            self.config_version = CONFIG_VERSION;
        }
    }
}

/// Manages configuration loading and saving
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Config next to the executable
    pub fn new() -> Result<Self> {
        let exe_path = std::env::current_exe()
            .map_err(|e| TrayError::ConfigError(format!("Could not get exe path: {}", e)))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| TrayError::ConfigError("Could not get exe directory".to_string()))?;
        Ok(Self::with_path(exe_dir.join(CONFIG_FILENAME)))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.config_dir().join("logs")
    }

    /// Resolve a configured path against the config directory
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir().join(path)
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| TrayError::ConfigError(format!("Could not read config: {}", e)))?;

        let mut config: AppConfig = toml::from_str(&content)
            .map_err(|e| TrayError::ConfigError(format!("Could not parse config: {}", e)))?;

        if config.config_version < CONFIG_VERSION {
            config.migrate();
            self.save(&config)?;
        }

        debug!("Loaded config from {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| TrayError::ConfigError(format!("Could not serialize config: {}", e)))?;

        fs::write(&self.config_path, content)
            .map_err(|e| TrayError::ConfigError(format!("Could not write config: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.config_version, CONFIG_VERSION);
        assert_eq!(config.tray.icon_path, "resources/tray.ico");
        assert_eq!(config.tray.callback_message(), WM_APP + 1);
    }

    #[test]
    fn test_callback_offset_clamped() {
        let tray = TrayConfig {
            callback_offset: 0x10000,
            ..TrayConfig::default()
        };
        assert_eq!(tray.callback_message(), 0xBFFF);
    }

    #[test]
    fn test_resolve_path() {
        let manager = ConfigManager::with_path(PathBuf::from("base").join(CONFIG_FILENAME));
        assert_eq!(
            manager.resolve_path("resources/tray.ico"),
            PathBuf::from("base").join("resources/tray.ico")
        );
        assert_eq!(manager.log_dir(), PathBuf::from("base").join("logs"));
    }
}
