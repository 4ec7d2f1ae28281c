use async_trait::async_trait;
use ethers::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use super::artifact::CompiledContract;
use crate::deploy::DeploymentError;

/// The chain operations a deployment needs
#[async_trait]
pub trait ChainDeployer: Send + Sync {
    /// Send the creation transaction and return its hash
    async fn submit(&self, contract: &CompiledContract) -> Result<TxHash, DeploymentError>;

    /// Wait until the transaction is mined. `None` means it left the mempool.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, DeploymentError>;

    /// Runtime code stored at `address`
    async fn code_at(&self, address: Address) -> Result<Bytes, DeploymentError>;
}

/// Deploys through any ethers middleware stack
pub struct ContractService<M> {
    client: Arc<M>,
    confirmations: usize,
    poll_interval: Duration,
}

impl<M: Middleware + 'static> ContractService<M> {
    pub fn new(client: Arc<M>, confirmations: usize, poll_interval: Duration) -> Self {
        Self {
            client,
            confirmations: confirmations.max(1),
            poll_interval,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ChainDeployer for ContractService<M> {
    async fn submit(&self, contract: &CompiledContract) -> Result<TxHash, DeploymentError> {
        let factory = ContractFactory::new(contract.abi.clone(), contract.bytecode.clone(), self.client.clone());
        let deployer = factory
            .deploy_tokens(Vec::new())
            .map_err(|e| DeploymentError::TransactionSubmission(e.to_string()))?;

        let pending = self
            .client
            .send_transaction(deployer.tx, None)
            .await
            .map_err(|e| DeploymentError::TransactionSubmission(e.to_string()))?;

        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Option<TransactionReceipt>, DeploymentError> {
        PendingTransaction::new(tx_hash, self.client.provider())
            .interval(self.poll_interval)
            .confirmations(self.confirmations)
            .await
            .map_err(|e| DeploymentError::Confirmation {
                tx_hash,
                reason: e.to_string(),
            })
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, DeploymentError> {
        self.client
            .get_code(address, None)
            .await
            .map_err(|e| DeploymentError::AddressResolution(format!("eth_getCode for {address:?} failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_artifact;
    use ethers::providers::MockProvider;

    const POLL: Duration = Duration::from_millis(5);

    fn service(confirmations: usize) -> (ContractService<Provider<MockProvider>>, MockProvider) {
        let (provider, mock) = Provider::<MockProvider>::mocked();
        let provider = provider.interval(POLL);
        (ContractService::new(Arc::new(provider), confirmations, POLL), mock)
    }

    /// A mined contract creation, shaped so it parses both as the transaction
    /// and as its receipt; the mock then answers either lookup in any order.
    fn mined_creation(tx_hash: TxHash, contract: Address) -> serde_json::Value {
        serde_json::json!({
            "hash": tx_hash,
            "transactionHash": tx_hash,
            "nonce": "0x0",
            "blockHash": H256::from_low_u64_be(0xb10c),
            "blockNumber": "0x2a",
            "transactionIndex": "0x0",
            "from": Address::from_low_u64_be(0xdead),
            "to": null,
            "value": "0x0",
            "gas": "0x30d40",
            "gasPrice": "0x3b9aca00",
            "input": "0x6080604052",
            "v": "0x1b",
            "r": "0x1",
            "s": "0x1",
            "cumulativeGasUsed": "0x1d4c0",
            "gasUsed": "0x1d4c0",
            "contractAddress": contract,
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "status": "0x1"
        })
    }

    async fn within_limit<F: std::future::Future>(fut: F) -> F::Output {
        tokio::time::timeout(Duration::from_secs(30), fut)
            .await
            .expect("mocked node call did not finish")
    }

    #[test]
    fn test_confirmations_never_below_one() {
        assert_eq!(service(0).0.confirmations, 1);
        assert_eq!(service(3).0.confirmations, 3);
    }

    #[tokio::test]
    async fn test_code_at_returns_node_answer() {
        let (service, mock) = service(1);
        mock.push::<Bytes, _>(Bytes::from(vec![0x60, 0x80, 0x60, 0x40])).unwrap();

        let code = service.code_at(Address::from_low_u64_be(1)).await.unwrap();
        assert_eq!(code.to_vec(), vec![0x60, 0x80, 0x60, 0x40]);
    }

    #[tokio::test]
    async fn test_code_at_failure_is_address_resolution() {
        let (service, _mock) = service(1);

        let err = service.code_at(Address::from_low_u64_be(1)).await.unwrap_err();
        assert!(matches!(err, DeploymentError::AddressResolution(_)));
    }

    #[tokio::test]
    async fn test_submit_failure_is_transaction_submission() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "AccessLogger", "0x6080604052");
        let contract = CompiledContract::resolve(dir.path(), "AccessLogger").unwrap();

        // no queued answers: gas estimation against the node fails
        let (service, _mock) = service(1);
        let err = within_limit(service.submit(&contract)).await.unwrap_err();
        assert!(matches!(err, DeploymentError::TransactionSubmission(_)));
    }

    #[tokio::test]
    async fn test_wait_returns_mined_receipt() {
        let tx_hash = TxHash::from_low_u64_be(7);
        let contract = Address::from_low_u64_be(0xc0de);

        // zero is raised to one confirmation, so no block number lookup follows
        let (service, mock) = service(0);
        mock.push::<serde_json::Value, _>(mined_creation(tx_hash, contract)).unwrap();
        mock.push::<serde_json::Value, _>(mined_creation(tx_hash, contract)).unwrap();

        let receipt = within_limit(service.wait_for_receipt(tx_hash))
            .await
            .unwrap()
            .expect("receipt");
        assert_eq!(receipt.transaction_hash, tx_hash);
        assert_eq!(receipt.contract_address, Some(contract));
        assert_eq!(receipt.status, Some(U64::one()));
    }

    #[tokio::test]
    async fn test_wait_failure_is_confirmation_error() {
        let tx_hash = TxHash::from_low_u64_be(8);
        let contract = Address::from_low_u64_be(0xc0de);

        // two confirmations need the current block, which the node fails to report
        let (service, mock) = service(2);
        mock.push::<serde_json::Value, _>(mined_creation(tx_hash, contract)).unwrap();
        mock.push::<serde_json::Value, _>(mined_creation(tx_hash, contract)).unwrap();

        let err = within_limit(service.wait_for_receipt(tx_hash)).await.unwrap_err();
        assert!(matches!(err, DeploymentError::Confirmation { tx_hash: h, .. } if h == tx_hash));
    }

    #[tokio::test]
    async fn test_wait_for_unknown_transaction() {
        let (service, _mock) = service(1);

        let receipt = within_limit(service.wait_for_receipt(TxHash::from_low_u64_be(9)))
            .await
            .unwrap();
        assert!(receipt.is_none());
    }
}
