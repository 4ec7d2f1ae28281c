use ethers::abi::Abi;
use ethers::types::Bytes;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::build_config::{CompilerSettings, OptimizerSettings};
use crate::deploy::DeploymentError;

/// Contract output as written by the toolchain (`hh-sol-artifact-1`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    source_name: String,
    abi: serde_json::Value,
    bytecode: String,
    #[serde(default)]
    link_references: serde_json::Map<String, serde_json::Value>,
}

/// Pointer from an artifact to the build info it was compiled in
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildInfoFile {
    solc_version: String,
    input: BuildInfoInput,
}

#[derive(Debug, Deserialize)]
struct BuildInfoInput {
    settings: BuildInfoSettings,
}

#[derive(Debug, Deserialize)]
struct BuildInfoSettings {
    #[serde(default)]
    optimizer: Option<BuildInfoOptimizer>,
}

#[derive(Debug, Deserialize)]
struct BuildInfoOptimizer {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    runs: Option<u32>,
}

/// Compiler settings an artifact was produced with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub solc_version: String,
    pub optimizer: OptimizerSettings,
}

/// A compiled contract ready to be deployed
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub contract_name: String,
    pub source_name: String,
    pub abi: Abi,
    abi_json: serde_json::Value,
    pub bytecode: Bytes,
    pub build_info: Option<BuildInfo>,
}

impl CompiledContract {
    /// Find the artifact for `name` under `artifacts_dir` and load it.
    ///
    /// Artifacts live at `<artifacts_dir>/<source path>/<Name>.json`; debug and
    /// build-info files next to them are not candidates.
    pub fn resolve(artifacts_dir: &Path, name: &str) -> Result<Self, DeploymentError> {
        let file_name = format!("{name}.json");
        let mut candidates = Vec::new();
        collect_artifacts(artifacts_dir, &file_name, &mut candidates).map_err(|source| {
            DeploymentError::Filesystem {
                path: artifacts_dir.to_path_buf(),
                source,
            }
        })?;

        match candidates.len() {
            0 => Err(DeploymentError::ContractNotFound {
                name: name.to_string(),
                artifacts_dir: artifacts_dir.to_path_buf(),
            }),
            1 => Self::load(&candidates[0]),
            _ => {
                candidates.sort();
                let candidates = candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(DeploymentError::AmbiguousContract {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Load a single artifact file
    pub fn load(path: &Path) -> Result<Self, DeploymentError> {
        let invalid = |reason: String| DeploymentError::InvalidArtifact {
            path: path.to_path_buf(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|source| DeploymentError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ArtifactFile = serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

        if !file.link_references.is_empty() {
            let libraries = file.link_references.keys().cloned().collect::<Vec<_>>().join(", ");
            return Err(invalid(format!("bytecode must be linked against {libraries}")));
        }

        let bytecode: Bytes = file
            .bytecode
            .parse()
            .map_err(|e| invalid(format!("bytecode: {e}")))?;
        if bytecode.is_empty() {
            return Err(invalid(format!(
                "{} has no bytecode; abstract contracts and interfaces cannot be deployed",
                file.contract_name
            )));
        }

        let abi: Abi = serde_json::from_value(file.abi.clone()).map_err(|e| invalid(format!("abi: {e}")))?;
        let build_info = read_build_info(path).map_err(invalid)?;

        Ok(Self {
            contract_name: file.contract_name,
            source_name: file.source_name,
            abi,
            abi_json: file.abi,
            bytecode,
            build_info,
        })
    }

    /// The ABI as compact JSON text with keys in a stable order
    pub fn abi_json(&self) -> Result<String, DeploymentError> {
        serde_json::to_string(&self.abi_json).map_err(DeploymentError::Serialization)
    }

    /// Fail if the artifact was built with different compiler settings
    pub fn check_compiler(&self, expected: &CompilerSettings) -> Result<(), DeploymentError> {
        let Some(info) = &self.build_info else {
            tracing::warn!(
                contract = %self.contract_name,
                "No build info next to artifact, skipping compiler check"
            );
            return Ok(());
        };

        if !expected.matches_version(&info.solc_version) || expected.optimizer != info.optimizer {
            return Err(DeploymentError::CompilerMismatch {
                contract: self.contract_name.clone(),
                expected: describe(&expected.version, &expected.optimizer),
                found: describe(&info.solc_version, &info.optimizer),
            });
        }

        Ok(())
    }
}

fn describe(version: &str, optimizer: &OptimizerSettings) -> String {
    if optimizer.enabled {
        format!("solc {version}, optimizer on ({} runs)", optimizer.runs)
    } else {
        format!("solc {version}, optimizer off")
    }
}

fn collect_artifacts(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect_artifacts(&path, file_name, out)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            out.push(path);
        }
    }

    Ok(())
}

/// Follow `<Name>.dbg.json` to the build info, if the toolchain wrote one
fn read_build_info(artifact_path: &Path) -> Result<Option<BuildInfo>, String> {
    let dbg_path = artifact_path.with_extension("dbg.json");
    if !dbg_path.exists() {
        return Ok(None);
    }

    let dbg: DebugFile = read_json(&dbg_path)?;
    let dir = dbg_path.parent().unwrap_or_else(|| Path::new("."));
    let info: BuildInfoFile = read_json(&dir.join(&dbg.build_info))?;

    // solc's own defaults apply when the optimizer block is absent
    let optimizer = match info.input.settings.optimizer {
        Some(o) => OptimizerSettings {
            enabled: o.enabled,
            runs: o.runs.unwrap_or(200),
        },
        None => OptimizerSettings {
            enabled: false,
            runs: 200,
        },
    };

    Ok(Some(BuildInfo {
        solc_version: info.solc_version,
        optimizer,
    }))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))
}
