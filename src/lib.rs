//! Deploys the AccessLogger contract from compiled artifacts and records its
//! address and ABI for the services that call it.

pub mod build_config;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod wallet;

#[cfg(test)]
mod test_utils;
