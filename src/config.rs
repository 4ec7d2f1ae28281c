use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::build_config::BuildConfig;
use crate::deploy::DeploySettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub network: NetworkConfig,
    pub deploy: DeploySettings,
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: Option<u64>,
    pub private_key: Option<String>,
    pub confirmations: usize,
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let build = match var("BUILD_CONFIG") {
            Some(path) => BuildConfig::from_file(Path::new(&path))?,
            None => BuildConfig::default(),
        };

        let name = var("DEPLOY_NETWORK").unwrap_or_else(|| "localhost".to_string());
        let rpc_url = match var("RPC_URL") {
            Some(url) => url,
            None => build
                .network_url(&name)
                .ok_or_else(|| ConfigError::UnknownNetwork(name.clone()))?
                .to_string(),
        };

        let chain_id = var("CHAIN_ID")
            .map(|v| v.parse().map_err(|_| ConfigError::Invalid("CHAIN_ID")))
            .transpose()?;

        Ok(Config {
            network: NetworkConfig {
                name,
                rpc_url,
                chain_id,
                private_key: var("PRIVATE_KEY").filter(|k| !k.trim().is_empty()),
                confirmations: parse_nonzero(&var, "CONFIRMATIONS", 1)?,
                poll_interval: Duration::from_millis(parse_or(&var, "POLL_INTERVAL_MS", 1000)?),
            },
            deploy: DeploySettings {
                contract_name: var("CONTRACT_NAME").unwrap_or_else(|| "AccessLogger".to_string()),
                artifacts_dir: PathBuf::from(var("ARTIFACTS_DIR").unwrap_or_else(|| "artifacts".to_string())),
                output_dir: PathBuf::from(var("OUTPUT_DIR").unwrap_or_else(|| "contracts".to_string())),
                compiler: build.solidity,
                confirmation_timeout: Duration::from_secs(parse_nonzero(&var, "CONFIRMATION_TIMEOUT_SECS", 120)?),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_nonzero<T: std::str::FromStr + Default + PartialEq>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    let value = parse_or(var, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid(key));
    }
    Ok(value)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for: {0}")]
    Invalid(&'static str),
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("Invalid build configuration: {0}")]
    BuildConfig(String),
}
