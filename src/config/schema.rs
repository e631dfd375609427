//! Configuration schema for duckdex
//!
//! Configuration is stored at `~/.config/duckdex/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Durable storage settings
    pub storage: StorageConfig,

    /// Discovery ledger settings
    pub ledger: LedgerConfig,

    /// Offline shell cache settings
    pub shell: ShellConfig,

    /// Image caching settings
    pub images: ImagesConfig,

    /// Known items, resolvable by id alone
    pub catalog: Vec<CatalogItem>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Dev mode: debug logging regardless of -v
    pub dev_mode: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            dev_mode: false,
        }
    }
}

/// Durable storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory (defaults to the platform state directory)
    pub data_dir: Option<PathBuf>,
}

/// Discovery ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Minimum seconds between two counted scans of the same item
    pub cooldown_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { cooldown_secs: 300 }
    }
}

/// Offline shell cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Origin the shell resources are served from
    pub origin: String,

    /// Cache generation name; bump to ship a new manifest
    pub generation: String,

    /// Offline fallback page (must also be listed in `resources`)
    pub offline_page: String,

    /// Parameterized detail route collapsed to a single cache entry
    pub detail_route: String,

    /// Resources fetched at install time
    pub resources: Vec<String>,

    /// Per-resource fetch timeout during install
    pub fetch_timeout_secs: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            generation: "duck-cache-v1".to_string(),
            offline_page: "/offline.html".to_string(),
            detail_route: "/duck.html".to_string(),
            resources: [
                "/",
                "/index.html",
                "/duck.html",
                "/myducks.html",
                "/scan.html",
                "/style.css",
                "/ducks.js",
                "/cardRenderer.js",
                "/app.js",
                "/offline.html",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fetch_timeout_secs: 30,
        }
    }
}

/// Image caching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Image assets seeded into the blob store on consent
    pub assets: Vec<String>,

    /// Shown when an image is not cached
    pub placeholder: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            assets: vec![
                "/images/duck_hat.png".to_string(),
                "/images/duck_mustache.png".to_string(),
            ],
            placeholder: "/images/placeholder.png".to_string(),
        }
    }
}

/// A known item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub fact: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[shell]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.shell.generation, "duck-cache-v1");
        assert_eq!(config.ledger.cooldown_secs, 300);
        assert!(config.catalog.is_empty());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [shell]
            generation = "duck-cache-v2"

            [[catalog]]
            id = "7"
            name = "Captain Quack"
            fact = "Wears a hat."
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.shell.generation, "duck-cache-v2");
        assert_eq!(config.shell.offline_page, "/offline.html"); // default preserved
        assert_eq!(config.catalog.len(), 1);
        assert!(config.catalog[0].image.is_none());
    }

    #[test]
    fn default_manifest_includes_offline_page() {
        let shell = ShellConfig::default();
        assert!(shell.resources.contains(&shell.offline_page));
        assert!(shell.resources.contains(&shell.detail_route));
    }
}
