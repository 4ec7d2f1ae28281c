//! Deploy a compiled contract and record where it landed.
//!
//! The run is strictly sequential: resolve the artifact, submit the creation
//! transaction, wait for it to be mined, confirm code exists at the new
//! address, then persist `{address, abi}`. Nothing is written unless every
//! earlier step succeeded.

mod error;

pub use error::DeploymentError;

use ethers::types::U64;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::build_config::CompilerSettings;
use crate::contracts::{ChainDeployer, CompiledContract, DeploymentRecord};

/// Everything a deployment run needs besides the chain connection
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub contract_name: String,
    pub artifacts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub compiler: CompilerSettings,
    pub confirmation_timeout: Duration,
}

/// Deploy `settings.contract_name` through `chain` and save its record.
///
/// Confirmation and the code check are each bounded by
/// `settings.confirmation_timeout`; cancelling
/// `shutdown` aborts the run at the next suspension point. A transaction that
/// was already sent stays on the network either way.
pub async fn deploy<D: ChainDeployer + ?Sized>(
    settings: &DeploySettings,
    chain: &D,
    shutdown: &CancellationToken,
) -> Result<DeploymentRecord, DeploymentError> {
    let contract = CompiledContract::resolve(&settings.artifacts_dir, &settings.contract_name)?;
    contract.check_compiler(&settings.compiler)?;

    tracing::debug!(
        contract = %contract.contract_name,
        source = %contract.source_name,
        bytecode_len = contract.bytecode.len(),
        "Resolved contract artifact"
    );

    let tx_hash = tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            return Err(DeploymentError::Cancelled { stage: "before submission" });
        }
        submitted = chain.submit(&contract) => submitted?,
    };

    tracing::info!(
        contract = %contract.contract_name,
        tx_hash = ?tx_hash,
        timeout = ?settings.confirmation_timeout,
        "Deployment transaction sent, waiting for confirmation"
    );

    let confirmation = tokio::time::timeout(settings.confirmation_timeout, chain.wait_for_receipt(tx_hash));
    let receipt = tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            return Err(DeploymentError::Cancelled { stage: "while awaiting confirmation" });
        }
        waited = confirmation => waited.map_err(|_| DeploymentError::ConfirmationTimeout {
            tx_hash,
            timeout: settings.confirmation_timeout,
        })??,
    };

    let receipt = receipt.ok_or_else(|| {
        DeploymentError::TransactionSubmission(format!("transaction {tx_hash:?} was dropped before being mined"))
    })?;

    if receipt.status == Some(U64::zero()) {
        return Err(DeploymentError::Reverted(tx_hash));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        DeploymentError::AddressResolution(format!("receipt for {tx_hash:?} has no contract address"))
    })?;

    let code = tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            return Err(DeploymentError::Cancelled { stage: "while checking deployed code" });
        }
        fetched = tokio::time::timeout(settings.confirmation_timeout, chain.code_at(address)) => {
            fetched.map_err(|_| {
                DeploymentError::AddressResolution(format!(
                    "eth_getCode for {address:?} not answered within {:?}",
                    settings.confirmation_timeout
                ))
            })??
        }
    };

    if code.is_empty() {
        return Err(DeploymentError::AddressResolution(format!("no code at {address:?}")));
    }

    let record = DeploymentRecord::new(address, contract.abi_json()?);
    tracing::info!(
        contract = %settings.contract_name,
        address = %record.address,
        block = ?receipt.block_number,
        gas_used = ?receipt.gas_used,
        "Contract deployed"
    );

    let path = record.save(&settings.output_dir, &settings.contract_name)?;
    tracing::info!(path = %path.display(), "Contract data saved");

    Ok(record)
}
