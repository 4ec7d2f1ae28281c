use ethers::prelude::*;
use ethers::utils::{format_ether, to_checksum};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Node manages no accounts; set PRIVATE_KEY")]
    NoAccounts,
}

/// The account that signs and pays for the deployment
#[derive(Debug, Clone)]
pub enum DeployAccount {
    /// Key held by this process, signed locally
    Local(LocalWallet),
    /// Unlocked account managed by the node
    Node(Address),
}

impl DeployAccount {
    /// Use `private_key` when given, otherwise the node's first account.
    ///
    /// A local key needs the chain id for replay protection; it is asked from
    /// the node unless configured.
    pub async fn resolve<M: Middleware>(
        private_key: Option<&str>,
        chain_id: Option<u64>,
        provider: &M,
    ) -> Result<Self, WalletError> {
        match private_key {
            Some(key) => {
                let wallet: LocalWallet = key
                    .trim()
                    .parse()
                    .map_err(|e: ethers::signers::WalletError| WalletError::InvalidKey(e.to_string()))?;
                let chain_id = match chain_id {
                    Some(id) => id,
                    None => provider
                        .get_chainid()
                        .await
                        .map_err(|e| WalletError::ProviderError(e.to_string()))?
                        .as_u64(),
                };
                Ok(Self::Local(wallet.with_chain_id(chain_id)))
            }
            None => {
                let accounts = provider
                    .get_accounts()
                    .await
                    .map_err(|e| WalletError::ProviderError(e.to_string()))?;
                accounts.first().copied().map(Self::Node).ok_or(WalletError::NoAccounts)
            }
        }
    }

    pub fn address(&self) -> Address {
        match self {
            Self::Local(wallet) => wallet.address(),
            Self::Node(address) => *address,
        }
    }

    /// Get the account address as a checksum string
    pub fn address_string(&self) -> String {
        to_checksum(&self.address(), None)
    }

    /// Check the native token balance
    pub async fn get_balance<M: Middleware>(&self, provider: &M) -> Result<U256, WalletError> {
        provider
            .get_balance(self.address(), None)
            .await
            .map_err(|e| WalletError::ProviderError(e.to_string()))
    }

    /// Format balance as human-readable string (in ETH)
    pub fn format_balance(balance: U256) -> String {
        format_ether(balance)
    }
}
