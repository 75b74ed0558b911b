//! Application configuration

use crate::AppError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub browse: BrowseConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

/// Browse view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Start location when the target field is empty and the drive list does not apply
    pub default_path: String,
    /// Listing failure messages containing one of these mean the backend has no usable connection
    pub connection_required_markers: Vec<String>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            default_path: "/".to_string(),
            connection_required_markers: vec![
                "Please connect to the SSH server first".to_string(),
                "Please make sure local mode is available".to_string(),
                // Messages sent by the stock backend
                "请先连接SSH服务器".to_string(),
                "请先确保本地模式正常".to_string(),
            ],
        }
    }
}

impl BrowseConfig {
    /// Does a listing failure message mean the connection is gone?
    pub fn is_connection_required(&self, message: &str) -> bool {
        self.connection_required_markers
            .iter()
            .any(|marker| !marker.is_empty() && message.contains(marker.as_str()))
    }
}

/// Operation log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept; the oldest are evicted
    pub capacity: usize,
    /// Show the log panel when a non-error entry is recorded
    pub auto_reveal: bool,
    /// Per-directory detail entries recorded after an empty-directory cleanup
    pub cleanup_detail_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            auto_reveal: true,
            cleanup_detail_limit: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub retention_days: u32,
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            retention_days: 7,
            json_file: true,
        }
    }
}

impl LoggingConfig {
    pub fn to_options(&self) -> app_log::LogOptions {
        app_log::LogOptions {
            default_level: self.level.clone(),
            json_file: self.json_file,
            directory: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `config_path`, falling back to defaults when missing
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from(app_log::QUALIFIER, app_log::ORGANIZATION, app_log::APPLICATION)
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Reject values the core cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.history.capacity == 0 {
            return Err(AppError::Config("history.capacity must be at least 1".to_string()));
        }
        if self.browse.default_path.trim().is_empty() {
            return Err(AppError::Config("browse.default_path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.history.capacity, 50);
        assert!(config.history.auto_reveal);
        assert_eq!(config.browse.default_path, "/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("[history]\ncapacity = 5\n").unwrap();
        assert_eq!(config.history.capacity, 5);
        assert!(config.history.auto_reveal);
        assert_eq!(config.logging.retention_days, 7);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.logging.level = "debug".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.history.capacity, 50);
    }

    #[test]
    fn test_connection_markers() {
        let browse = BrowseConfig::default();
        assert!(browse.is_connection_required("请先连接SSH服务器"));
        assert!(browse.is_connection_required("Error: Please connect to the SSH server first."));
        assert!(!browse.is_connection_required("Permission denied"));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = AppConfig::default();
        config.history.capacity = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
