//! CLI configuration file.

use certum_core::ExplorerLinks;
use certum_scan::ScanConfig;
use certum_scan::scanner::{DEFAULT_CHAIN_ID, DEFAULT_PROVIDER_CEILING};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid config JSON
    #[error("invalid config {path}: {source}")]
    Malformed {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Settings shared by every subcommand; missing keys take defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// redb file holding the persisted mirror
    pub mirror_path: PathBuf,
    /// JSON fixture backing the simulated ledger
    pub ledger_path: PathBuf,
    /// Block-explorer root
    pub explorer_base_url: String,
    /// Network the certificate contracts live on
    pub required_chain_id: u64,
    /// Requested blocks per scan window
    pub window_width: u64,
    /// Provider per-query block ceiling
    pub provider_ceiling: u64,
    /// First block to scan
    pub lower_bound: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            mirror_path: PathBuf::from(".certum/mirror.redb"),
            ledger_path: PathBuf::from(".certum/ledger.json"),
            explorer_base_url: ExplorerLinks::default().base_url,
            required_chain_id: DEFAULT_CHAIN_ID,
            window_width: DEFAULT_PROVIDER_CEILING - 1,
            provider_ceiling: DEFAULT_PROVIDER_CEILING,
            lower_bound: 0,
        }
    }
}

impl CliConfig {
    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, otherwise defaults
    ///
    /// # Errors
    ///
    /// Returns error if a given file cannot be loaded
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Override the ledger fixture path
    #[must_use]
    pub fn with_ledger_path(mut self, path: PathBuf) -> Self {
        self.ledger_path = path;
        self
    }

    /// Override the mirror path
    #[must_use]
    pub fn with_mirror_path(mut self, path: PathBuf) -> Self {
        self.mirror_path = path;
        self
    }

    /// Scanner settings
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new(self.required_chain_id)
            .with_lower_bound(self.lower_bound)
            .with_window_width(self.window_width)
            .with_provider_ceiling(self.provider_ceiling)
    }

    /// Explorer link builder
    #[must_use]
    pub fn explorer(&self) -> ExplorerLinks {
        ExplorerLinks::new(self.explorer_base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certum.json");
        std::fs::write(&path, r#"{"window_width": 500, "required_chain_id": 1}"#).unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.window_width, 500);
        assert_eq!(config.required_chain_id, 1);
        assert_eq!(config.provider_ceiling, DEFAULT_PROVIDER_CEILING);
        assert_eq!(config.scan_config().effective_width(), 500);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certum.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            CliConfig::load(&path),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_file_only_when_given() {
        assert_eq!(CliConfig::load_or_default(None).unwrap(), CliConfig::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CliConfig::load_or_default(Some(&dir.path().join("absent.json"))),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_default_scan_width_below_ceiling() {
        let config = CliConfig::default();
        assert!(config.scan_config().effective_width() < config.provider_ceiling);
        assert_eq!(
            config.explorer().base_url,
            "https://sepolia.etherscan.io"
        );
    }
}
