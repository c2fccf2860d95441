//! The compile-and-deploy pipeline
//!
//! [`run`] executes every step in order: configuration, source, compiler,
//! artifact, deployment, `retrieve()`, `store(n)`, `retrieve()`. The first
//! failure ends the run; nothing is retried and nothing is resumed on the
//! next run.

pub mod compile;
pub mod deploy;

use crate::{
	constants,
	core::config::{CompilerConfig, Config},
	types::error::Result,
};
use alloy_primitives::U256;
use std::path::PathBuf;

pub use deploy::DeploymentReport;

/// Inputs that do not come from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
	pub source: PathBuf,
	pub artifact: PathBuf,
	pub contract: String,
	pub solc_version: String,
	pub store_value: U256,
	/// Stop after writing the artifact
	pub compile_only: bool,
}

impl Default for PipelineOptions {
	fn default() -> Self {
		Self {
			source: PathBuf::from(constants::DEFAULT_SOURCE_PATH),
			artifact: PathBuf::from(constants::DEFAULT_ARTIFACT_PATH),
			contract: constants::DEFAULT_CONTRACT_NAME.to_string(),
			solc_version: constants::DEFAULT_SOLC_VERSION.to_string(),
			store_value: U256::from(constants::DEFAULT_STORE_VALUE),
			compile_only: false,
		}
	}
}

impl PipelineOptions {
	pub fn total_steps(&self) -> usize {
		if self.compile_only {
			3
		} else {
			7
		}
	}
}

/// Run the whole pipeline with configuration from the environment
pub async fn run(options: &PipelineOptions) -> Result<DeploymentReport> {
	run_with_lookup(options, |key| std::env::var(key).ok()).await
}

/// Run the whole pipeline with configuration from an arbitrary key lookup
///
/// Configuration is loaded and validated before the source is even read, so
/// a missing credential never leads to a network call.
///
/// # Arguments
/// * `options` - Paths, contract name, solc version and the value to store
/// * `lookup` - Resolves configuration keys such as `RPC_URL`
pub async fn run_with_lookup<F>(options: &PipelineOptions, lookup: F) -> Result<DeploymentReport>
where
	F: Fn(&str) -> Option<String>,
{
	let config = Config::from_lookup(&lookup)?;
	let compiler_config = CompilerConfig::from_lookup(&options.solc_version, &lookup)?;
	run_with(options, &config, &compiler_config).await
}

/// Run the whole pipeline with explicit configuration
pub async fn run_with(
	options: &PipelineOptions,
	config: &Config,
	compiler_config: &CompilerConfig,
) -> Result<DeploymentReport> {
	let artifact = compile::compile(options, compiler_config).await?;
	deploy::deploy_and_interact(options, config, &artifact).await
}
