//! Command-line interface definitions and parsing
//!
//! Two commands: `run` executes the whole pipeline, `compile` stops after
//! the compiler output has been written. Paths and the compiler version are
//! global so both commands accept them.

pub mod output;

use crate::{constants, operations::PipelineOptions};
use alloy_primitives::U256;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compile SimpleStorage, deploy it to a local node and exercise it
#[derive(Parser, Debug)]
#[command(name = "simple-storage")]
#[command(about = "Compile, deploy and call the SimpleStorage contract on a local node")]
#[command(version)]
pub struct Cli {
	#[command(flatten)]
	pub global: GlobalArgs,

	#[command(subcommand)]
	pub command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
	/// Solidity source file to compile
	#[arg(long, global = true, default_value = constants::DEFAULT_SOURCE_PATH)]
	pub source: PathBuf,

	/// Where to write the full compiler output
	#[arg(long, global = true, default_value = constants::DEFAULT_ARTIFACT_PATH)]
	pub artifact: PathBuf,

	/// Contract to extract from the compiler output
	#[arg(long, global = true, default_value = constants::DEFAULT_CONTRACT_NAME)]
	pub contract: String,

	/// Exact solc release to compile with
	#[arg(long, global = true, env = "SOLC_VERSION", default_value = constants::DEFAULT_SOLC_VERSION)]
	pub solc_version: String,

	/// Enable debug logging for this crate
	#[arg(long, global = true)]
	pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Compile, deploy, call retrieve(), store a value and call retrieve() again
	Run {
		/// Number passed to store()
		#[arg(long, default_value_t = U256::from(constants::DEFAULT_STORE_VALUE), value_parser = parse_uint256)]
		value: U256,
	},

	/// Compile only and write the compiler output
	Compile,
}

impl Cli {
	/// Pipeline options for the selected command
	pub fn pipeline_options(&self) -> PipelineOptions {
		let (store_value, compile_only) = match &self.command {
			Commands::Run { value } => (*value, false),
			Commands::Compile => (U256::from(constants::DEFAULT_STORE_VALUE), true),
		};

		PipelineOptions {
			source: self.global.source.clone(),
			artifact: self.global.artifact.clone(),
			contract: self.global.contract.clone(),
			solc_version: self.global.solc_version.clone(),
			store_value,
			compile_only,
		}
	}
}

/// Accepts decimal or 0x-prefixed hex
fn parse_uint256(raw: &str) -> std::result::Result<U256, String> {
	let raw = raw.trim();
	let parsed = match raw.strip_prefix("0x") {
		Some(hex) => U256::from_str_radix(hex, 16),
		None => U256::from_str_radix(raw, 10),
	};
	parsed.map_err(|e| format!("not a uint256: {}", e))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_run_defaults() {
		let cli = Cli::try_parse_from(["simple-storage", "run"]).unwrap();
		let options = cli.pipeline_options();

		assert_eq!(options.store_value, U256::from(15));
		assert_eq!(options.source, PathBuf::from("./SimpleStorage.sol"));
		assert_eq!(options.contract, "SimpleStorage");
		assert!(!options.compile_only);
	}

	#[test]
	fn test_compile_with_global_options() {
		let cli = Cli::try_parse_from([
			"simple-storage",
			"compile",
			"--source",
			"contracts/Other.sol",
			"--artifact",
			"out/other.json",
			"--contract",
			"Other",
		])
		.unwrap();
		let options = cli.pipeline_options();

		assert!(options.compile_only);
		assert_eq!(options.total_steps(), 3);
		assert_eq!(options.source, PathBuf::from("contracts/Other.sol"));
		assert_eq!(options.artifact, PathBuf::from("out/other.json"));
		assert_eq!(options.contract, "Other");
	}

	#[test]
	fn test_store_value_parsing() {
		let cli = Cli::try_parse_from(["simple-storage", "run", "--value", "0x2a"]).unwrap();
		assert!(matches!(cli.command, Commands::Run { value } if value == U256::from(42)));

		assert!(Cli::try_parse_from(["simple-storage", "run", "--value", "-1"]).is_err());
		assert!(Cli::try_parse_from(["simple-storage", "run", "--value", "fifteen"]).is_err());
	}
}
