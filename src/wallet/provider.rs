use ethers::prelude::*;
use std::time::Duration;

use super::WalletError;

pub type HttpProvider = Provider<Http>;

/// Connect to the JSON-RPC endpoint of the target network
pub fn connect(rpc_url: &str, poll_interval: Duration) -> Result<HttpProvider, WalletError> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| WalletError::ProviderError(format!("{rpc_url}: {e}")))?;
    Ok(provider.interval(poll_interval))
}
