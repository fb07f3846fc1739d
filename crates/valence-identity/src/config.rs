use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cluster::ResolvePolicy;

/// Configuration loading/saving errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(String),
}

/// Configuration for an identity manager.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentityConfig {
    /// Store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Path to a JSON snapshot file. Unset keeps the store in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolveConfig {
    /// Default member filter for `resolve_identity`.
    #[serde(default)]
    pub policy: ResolvePolicy,
}

impl IdentityConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. A missing file yields the default config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: IdentityConfig =
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
