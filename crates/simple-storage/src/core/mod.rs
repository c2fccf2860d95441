//! Core building blocks of the pipeline
//!
//! Configuration, compiler management and invocation, artifact extraction,
//! node access with the transaction lifecycle, and the deployed contract
//! handle.

pub mod artifact;
pub mod blockchain;
pub mod compiler;
pub mod config;
pub mod contract;
pub mod logging;
pub mod solc;

#[cfg(test)]
pub(crate) mod mock_node;

pub use artifact::{CompilerOutput, ContractArtifact};
pub use blockchain::{NonceTracker, Provider, TxBuilder};
pub use compiler::{Compiler, SourceFile};
pub use config::{CompilerConfig, Config};
pub use contract::DeployedContract;
pub use logging::init_logging;
pub use solc::{Solc, SolcInstaller};
