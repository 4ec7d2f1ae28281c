use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ConfigError;

/// Compiler and network settings the contract is built and deployed with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub solidity: CompilerSettings,
    pub networks: BTreeMap<String, NetworkEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    pub version: String,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub url: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: 200,
        }
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            version: "0.8.28".to_string(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            "localhost".to_string(),
            NetworkEntry {
                url: "http://127.0.0.1:8545".to_string(),
            },
        );

        Self {
            solidity: CompilerSettings::default(),
            networks,
        }
    }
}

impl BuildConfig {
    /// Read a build configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::BuildConfig(format!("{}: {}", path.display(), e)))?;
        let config: BuildConfig = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::BuildConfig(format!("{}: {}", path.display(), e)))?;
        config.solidity.validate()?;
        Ok(config)
    }

    /// Look up the RPC URL of a named network
    pub fn network_url(&self, name: &str) -> Option<&str> {
        self.networks.get(name).map(|n| n.url.as_str())
    }
}

impl CompilerSettings {
    /// Check that `version` names a solc release the toolchain can fetch.
    ///
    /// Releases are plain `MAJOR.MINOR.PATCH`; solc has only shipped 0.x and
    /// the toolchain supports 0.4.11 onwards.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = || ConfigError::BuildConfig(format!("unsupported compiler version {:?}", self.version));

        let parts: Vec<u32> = self
            .version
            .split('.')
            .map(|p| p.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;

        match parts.as_slice() {
            [0, minor, patch] if (*minor, *patch) >= (4, 11) => Ok(()),
            _ => Err(invalid()),
        }
    }

    /// Whether a solc version reported by the toolchain is this release.
    /// Long versions such as `0.8.28+commit.7893614a` match on the release part.
    pub fn matches_version(&self, reported: &str) -> bool {
        let release = reported.split('+').next().unwrap_or(reported);
        release.trim_start_matches('v') == self.version
    }
}
