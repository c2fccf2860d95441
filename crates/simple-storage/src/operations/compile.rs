//! Source loading, compilation and artifact extraction
//!
//! Steps (a) to (c) of the pipeline. Needs no credentials and never talks
//! to a node, so it can run on its own through the `compile` command.

use crate::{
	cli::output::Display,
	core::{
		artifact::ContractArtifact,
		compiler::{Compiler, SourceFile},
		config::CompilerConfig,
		solc::Solc,
	},
	operations::PipelineOptions,
	types::error::{Error, Result},
};
use tracing::info;

/// Compile the configured source and write the full output to disk
///
/// Returns the artifact of the requested contract. The output file is
/// overwritten on every run, and is written even when the requested
/// contract turns out to be missing from it.
///
/// # Arguments
/// * `options` - Source and artifact paths plus the contract name
/// * `compiler_config` - Pinned version and where to find or install solc
///
/// # Errors
/// Returns Error::SourceNotFound, any compiler resolution error,
/// Error::Compilation with solc's diagnostics, or Error::ContractNotFound
pub async fn compile(options: &PipelineOptions, compiler_config: &CompilerConfig) -> Result<ContractArtifact> {
	Display::step(1, options.total_steps(), &format!("Loading {}", options.source.display()));
	let source = SourceFile::load(&options.source).await?;

	Display::step(2, options.total_steps(), &format!("Compiling with solc {}", compiler_config.version));
	let compiler = Compiler::new(Solc::resolve(compiler_config).await?);
	Display::kv("solc", &compiler.solc().path.display().to_string());
	let output = compiler.compile(&source).await?;

	Display::step(3, options.total_steps(), &format!("Writing {}", options.artifact.display()));
	output.save(&options.artifact)?;
	let artifact = match output.contract(&source.name, &options.contract) {
		Err(err @ Error::ContractNotFound { .. }) => {
			if let Ok(compiled) = output.contracts_in(&source.name) {
				let names: Vec<&str> = compiled.keys().map(String::as_str).collect();
				Display::info(&format!("Contracts in {}: {}", source.name, names.join(", ")));
			}
			return Err(err);
		},
		other => other?,
	};

	info!(
		contract = %artifact.name,
		bytecode_len = artifact.bytecode.len(),
		functions = artifact.abi.functions().count(),
		"Extracted contract artifact"
	);
	Display::kv("bytecode", &format!("{} bytes", artifact.bytecode.len()));

	Ok(artifact)
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;
	use semver::Version;
	use std::os::unix::fs::PermissionsExt;
	use std::path::Path;
	use tempfile::TempDir;

	const STUB_SOLC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
	echo "solc, the solidity compiler commandline interface"
	echo "Version: 0.8.8+commit.dddeac2f.Linux.g++"
	exit 0
fi
cat > /dev/null
cat <<'EOF'
{"contracts":{"SimpleStorage.sol":{"SimpleStorage":{"abi":[],"metadata":"{\"output\":{\"abi\":[{\"inputs\":[],\"name\":\"retrieve\",\"outputs\":[{\"internalType\":\"uint256\",\"name\":\"\",\"type\":\"uint256\"}],\"stateMutability\":\"view\",\"type\":\"function\"}]}}","evm":{"bytecode":{"object":"6080604052","sourceMap":"57:1:0"}}}}},"sources":{"SimpleStorage.sol":{"id":0}}}
EOF
"#;

	fn setup(dir: &Path) -> (PipelineOptions, CompilerConfig) {
		let stub = dir.join("solc");
		std::fs::write(&stub, STUB_SOLC).unwrap();
		std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

		let source = dir.join("SimpleStorage.sol");
		std::fs::write(&source, "pragma solidity ^0.8.0;\ncontract SimpleStorage {}\n").unwrap();

		let options = PipelineOptions {
			source,
			artifact: dir.join("out").join("compiled_code.json"),
			compile_only: true,
			..PipelineOptions::default()
		};
		let compiler_config = CompilerConfig {
			version: Version::new(0, 8, 8),
			solc_path: Some(stub),
			install_dir: dir.join("managed"),
			binaries_url: "http://localhost".to_string(),
		};
		(options, compiler_config)
	}

	#[tokio::test]
	async fn test_compile_writes_full_output() {
		let dir = TempDir::new().unwrap();
		let (options, compiler_config) = setup(dir.path());

		let artifact = compile(&options, &compiler_config).await.unwrap();
		assert_eq!(artifact.name, "SimpleStorage");
		assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
		assert!(artifact.abi.function("retrieve").is_some());

		let saved: serde_json::Value =
			serde_json::from_str(&std::fs::read_to_string(&options.artifact).unwrap()).unwrap();
		assert_eq!(saved["sources"]["SimpleStorage.sol"]["id"], 0);
		assert!(saved["contracts"]["SimpleStorage.sol"]["SimpleStorage"]["metadata"].is_string());
	}

	#[tokio::test]
	async fn test_unknown_contract_still_writes_output() {
		let dir = TempDir::new().unwrap();
		let (mut options, compiler_config) = setup(dir.path());
		options.contract = "Missing".to_string();

		let err = compile(&options, &compiler_config).await.unwrap_err();
		assert!(matches!(err, Error::ContractNotFound { ref contract, .. } if contract == "Missing"));
		assert!(options.artifact.exists());
	}
}
