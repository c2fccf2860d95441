//! Compile, deploy and exercise the SimpleStorage contract
//!
//! The library drives a fixed pipeline: compile a Solidity source with a
//! pinned solc release, save the compiler output, deploy the contract to a
//! local development node with a locally signed legacy transaction, then
//! call `retrieve()`, send `store(n)` and call `retrieve()` again.

pub mod cli;
pub mod constants;
pub mod core;
pub mod operations;
pub mod types;

pub use crate::core::{CompilerConfig, Config, ContractArtifact, DeployedContract};
pub use operations::{DeploymentReport, PipelineOptions};
pub use types::{Error, Result};
