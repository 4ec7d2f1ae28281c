pub mod account;
pub mod provider;

pub use account::*;
pub use provider::*;
