use ethers::types::TxHash;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("No artifact for contract {name} under {}", artifacts_dir.display())]
    ContractNotFound { name: String, artifacts_dir: PathBuf },
    #[error("Contract name {name} matches several artifacts: {candidates}")]
    AmbiguousContract { name: String, candidates: String },
    #[error("Invalid artifact {}: {reason}", path.display())]
    InvalidArtifact { path: PathBuf, reason: String },
    #[error("{contract} was compiled with {found}, expected {expected}; recompile the contracts")]
    CompilerMismatch {
        contract: String,
        expected: String,
        found: String,
    },
    #[error("Failed to submit deployment transaction: {0}")]
    TransactionSubmission(String),
    #[error("Failed while waiting for {tx_hash:?}: {reason}")]
    Confirmation { tx_hash: TxHash, reason: String },
    #[error("Transaction {tx_hash:?} not confirmed within {timeout:?}")]
    ConfirmationTimeout { tx_hash: TxHash, timeout: Duration },
    #[error("Deployment cancelled {stage}")]
    Cancelled { stage: &'static str },
    #[error("Deployment transaction {0:?} reverted")]
    Reverted(TxHash),
    #[error("Could not resolve deployed address: {0}")]
    AddressResolution(String),
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
