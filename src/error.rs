//! Error types for duckdex
//!
//! All modules use `DexResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for duckdex operations
pub type DexResult<T> = Result<T, DexError>;

/// All errors that can occur in duckdex
#[derive(Error, Debug)]
pub enum DexError {
    // Storage errors
    #[error("Storage unavailable ({store}): {reason}")]
    StoreUnavailable { store: String, reason: String },

    #[error("Discovery has no usable id or name")]
    InvalidKey,

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    // Network errors
    #[error("Failed to fetch {url}: {reason}")]
    AssetFetchFailed { url: String, reason: String },

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Fetch of {url} timed out after {secs}s")]
    FetchTimeout { url: String, secs: u64 },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Shell cache errors
    #[error("Shell install of {generation} failed: {reason}")]
    InstallFailed { generation: String, reason: String },

    // Reset errors
    #[error("Reset failed: {0}")]
    ResetFailed(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl DexError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage-unavailable error
    pub fn unavailable(store: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            store: store.into(),
            reason: reason.into(),
        }
    }

    /// Create an asset fetch error
    pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetFetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether a component boundary should log this error and carry on
    /// instead of surfacing it to the user
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. }
                | Self::InvalidKey
                | Self::AlreadyExists(_)
                | Self::AssetFetchFailed { .. }
                | Self::NetworkUnavailable(_)
                | Self::FetchTimeout { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::StoreUnavailable { .. } => {
                Some("Check that the data directory exists and is writable (--data-dir)")
            }
            Self::NetworkUnavailable(_) | Self::FetchTimeout { .. } => {
                Some("Check your connection, or install the offline shell with: duckdex install")
            }
            Self::ConfigExists(_) => Some("Use --force to overwrite"),
            Self::InvalidKey => Some("Pass --id or --name"),
            _ => None,
        }
    }
}
