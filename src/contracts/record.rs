use ethers::abi::Abi;
use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::deploy::DeploymentError;

/// Where a deployed contract lives and how to call it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: String,
    pub abi: String,
}

impl DeploymentRecord {
    pub fn new(address: Address, abi_json: String) -> Self {
        Self {
            address: to_checksum(&address, None),
            abi: abi_json,
        }
    }

    /// Path of the record for `contract_name` inside `dir`
    pub fn path_for(dir: &Path, contract_name: &str) -> PathBuf {
        dir.join(format!("{contract_name}.json"))
    }

    /// Write the record as pretty JSON, replacing any previous file.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so readers never see a partial record.
    pub fn save(&self, dir: &Path, contract_name: &str) -> Result<PathBuf, DeploymentError> {
        let fs_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| DeploymentError::Filesystem { path, source }
        };

        std::fs::create_dir_all(dir).map_err(fs_err(dir))?;

        let path = Self::path_for(dir, contract_name);
        let json = serde_json::to_string_pretty(self).map_err(DeploymentError::Serialization)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fs_err(dir))?;
        tmp.write_all(json.as_bytes()).map_err(fs_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(fs_err(tmp.path()))?;
        tmp.persist(&path).map_err(|e| DeploymentError::Filesystem {
            path: path.clone(),
            source: e.error,
        })?;

        Ok(path)
    }

    /// Read a record back and check both fields are usable
    pub fn load(path: &Path) -> Result<Self, DeploymentError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DeploymentError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;
        let record: DeploymentRecord = serde_json::from_str(&raw).map_err(DeploymentError::Serialization)?;

        record.contract_address()?;
        record.abi()?;

        Ok(record)
    }

    pub fn contract_address(&self) -> Result<Address, DeploymentError> {
        self.address
            .parse()
            .map_err(|_| DeploymentError::AddressResolution(format!("invalid address in record: {}", self.address)))
    }

    pub fn abi(&self) -> Result<Abi, DeploymentError> {
        serde_json::from_str(&self.abi).map_err(DeploymentError::Serialization)
    }
}
