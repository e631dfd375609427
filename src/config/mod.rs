//! Configuration management for duckdex

pub mod schema;

pub use schema::Config;

use crate::error::{DexError, DexResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("duckdex")
            .join("config.toml")
    }

    /// Get the default data directory path
    pub fn default_data_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("duckdex")
    }

    /// Resolve the data directory: explicit override, then config, then default
    pub fn data_dir(config: &Config, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| config.storage.data_dir.clone())
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> DexResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> DexResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DexError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| DexError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> DexResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            DexError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Write the default configuration, refusing to clobber unless forced
    pub async fn init(&self, force: bool) -> DexResult<()> {
        if self.config_path.exists() && !force {
            return Err(DexError::ConfigExists(self.config_path.clone()));
        }
        self.save(&Config::default()).await
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> DexResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DexError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.shell.detail_route, "/duck.html");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.ledger.cooldown_secs = 60;

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.ledger.cooldown_secs, 60);
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        manager.init(false).await.unwrap();
        let err = manager.init(false).await.unwrap_err();
        assert!(matches!(err, DexError::ConfigExists(_)));
        manager.init(true).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[ledger]\ncooldown_secs = \"soon\"").await.unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        match err {
            DexError::ConfigInvalid { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn data_dir_precedence() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/from/config"));

        assert_eq!(
            ConfigManager::data_dir(&config, Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            ConfigManager::data_dir(&config, None),
            PathBuf::from("/from/config")
        );
    }
}
