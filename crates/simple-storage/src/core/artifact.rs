//! Compilation artifacts
//!
//! [`CompilerOutput`] keeps the complete standard-JSON result so it can be
//! written to disk unchanged. [`ContractArtifact`] is the part the rest of
//! the pipeline needs: the parsed ABI, the creation bytecode and the source
//! map of one contract.

use crate::types::{
	error::{Error, Result},
	hex::Hex,
};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// ABI and bytecode of one compiled contract
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
	pub name: String,
	pub abi: JsonAbi,
	pub bytecode: Bytes,
	pub source_map: Option<String>,
}

impl ContractArtifact {
	/// Whether the contract can be deployed (abstract contracts and
	/// interfaces compile to empty bytecode)
	pub fn is_deployable(&self) -> bool {
		!self.bytecode.is_empty()
	}
}

/// Full standard-JSON compiler output
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOutput(Value);

impl CompilerOutput {
	pub fn new(raw: Value) -> Self {
		Self(raw)
	}

	/// Raw JSON as returned by the compiler
	pub fn raw(&self) -> &Value {
		&self.0
	}

	/// Extract one contract from the nested `contracts.<file>.<name>` entry
	///
	/// # Errors
	/// Returns Error::ContractNotFound if the entry is absent and
	/// Error::InvalidArtifact if its ABI or bytecode cannot be read
	pub fn contract(&self, file: &str, name: &str) -> Result<ContractArtifact> {
		let entry = self
			.0
			.get("contracts")
			.and_then(|c| c.get(file))
			.and_then(|f| f.get(name))
			.ok_or_else(|| Error::ContractNotFound {
				file: file.to_string(),
				contract: name.to_string(),
			})?;

		parse_contract(name, entry)
	}

	/// Every contract compiled from one source file, keyed by contract name
	pub fn contracts_in(&self, file: &str) -> Result<BTreeMap<String, ContractArtifact>> {
		let contracts = self
			.0
			.get("contracts")
			.and_then(|c| c.get(file))
			.and_then(Value::as_object)
			.ok_or_else(|| Error::InvalidArtifact(format!("no contracts for {}", file)))?;

		contracts
			.iter()
			.map(|(name, entry)| Ok((name.clone(), parse_contract(name, entry)?)))
			.collect()
	}

	/// Write the full output as JSON, replacing any previous file
	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent)?;
		}

		let file = std::fs::File::create(path)?;
		serde_json::to_writer(file, &self.0)?;

		debug!(path = %path.display(), "Wrote compilation artifact");
		Ok(())
	}
}

fn parse_contract(name: &str, entry: &Value) -> Result<ContractArtifact> {
	let abi = parse_abi(name, entry)?;

	let bytecode_obj = entry
		.pointer("/evm/bytecode/object")
		.and_then(Value::as_str)
		.ok_or_else(|| Error::InvalidArtifact(format!("{}: no bytecode in output", name)))?;

	// Unlinked library placeholders are not valid hex
	if bytecode_obj.contains("__$") {
		return Err(Error::InvalidArtifact(format!(
			"{}: bytecode has unlinked library references",
			name
		)));
	}

	let bytecode = Hex::decode(bytecode_obj)
		.map_err(|e| Error::InvalidArtifact(format!("{}: {}", name, e)))?;

	let source_map = entry
		.pointer("/evm/bytecode/sourceMap")
		.and_then(Value::as_str)
		.map(str::to_string);

	Ok(ContractArtifact {
		name: name.to_string(),
		abi,
		bytecode,
		source_map,
	})
}

/// The ABI embedded in the metadata string, or the top-level `abi` entry
fn parse_abi(name: &str, entry: &Value) -> Result<JsonAbi> {
	if let Some(metadata) = entry.get("metadata").and_then(Value::as_str).filter(|m| !m.is_empty()) {
		let metadata: Value = serde_json::from_str(metadata)
			.map_err(|e| Error::InvalidArtifact(format!("{}: invalid metadata: {}", name, e)))?;
		if let Some(abi) = metadata.pointer("/output/abi") {
			return serde_json::from_value(abi.clone())
				.map_err(|e| Error::InvalidArtifact(format!("{}: invalid ABI in metadata: {}", name, e)));
		}
	}

	let abi = entry
		.get("abi")
		.ok_or_else(|| Error::InvalidArtifact(format!("{}: no ABI in output", name)))?;
	serde_json::from_value(abi.clone()).map_err(|e| Error::InvalidArtifact(format!("{}: invalid ABI: {}", name, e)))
}
