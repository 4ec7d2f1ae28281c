// Compiled artifacts in, deployment records out
pub mod artifact;
pub mod record;
pub mod service;

pub use artifact::CompiledContract;
pub use record::DeploymentRecord;
pub use service::{ChainDeployer, ContractService};
