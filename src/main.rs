use std::process::ExitCode;
use std::sync::Arc;

use access_logger_deploy::config::Config;
use access_logger_deploy::contracts::{ChainDeployer, ContractService, DeploymentRecord};
use access_logger_deploy::deploy::deploy;
use access_logger_deploy::wallet::{connect, DeployAccount};
use anyhow::Context;
use ethers::middleware::SignerMiddleware;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "access_logger_deploy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling deployment");
            trigger.cancel();
        }
    });

    // Ctrl-C ends the run at any await, including account and balance lookups
    let outcome = tokio::select! {
        biased;
        result = run(&shutdown) => result,
        _ = shutdown.cancelled() => Err(anyhow::anyhow!("deployment interrupted")),
    };

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Deployment failed");
            ExitCode::from(1)
        }
    }
}

async fn run(shutdown: &CancellationToken) -> anyhow::Result<DeploymentRecord> {
    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        network = %config.network.name,
        rpc_url = %config.network.rpc_url,
        contract = %config.deploy.contract_name,
        "Starting deployment"
    );

    let provider = connect(&config.network.rpc_url, config.network.poll_interval)?;
    let account = DeployAccount::resolve(
        config.network.private_key.as_deref(),
        config.network.chain_id,
        &provider,
    )
    .await
    .context("resolving deployer account")?;

    let balance = account
        .get_balance(&provider)
        .await
        .context("reading deployer balance")?;
    tracing::info!(
        deployer = %account.address_string(),
        balance = %DeployAccount::format_balance(balance),
        "Deploying from account"
    );

    let confirmations = config.network.confirmations;
    let poll_interval = config.network.poll_interval;
    let record = match account {
        DeployAccount::Local(wallet) => {
            let client = SignerMiddleware::new(provider, wallet);
            let service = ContractService::new(Arc::new(client), confirmations, poll_interval);
            run_pipeline(&config, &service, shutdown).await?
        }
        DeployAccount::Node(address) => {
            let client = provider.with_sender(address);
            let service = ContractService::new(Arc::new(client), confirmations, poll_interval);
            run_pipeline(&config, &service, shutdown).await?
        }
    };

    Ok(record)
}

async fn run_pipeline<D: ChainDeployer>(
    config: &Config,
    chain: &D,
    shutdown: &CancellationToken,
) -> anyhow::Result<DeploymentRecord> {
    deploy(&config.deploy, chain, shutdown)
        .await
        .with_context(|| format!("deploying {} to {}", config.deploy.contract_name, config.network.name))
}
