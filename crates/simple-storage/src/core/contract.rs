//! Deploying a compiled contract and talking to it through its ABI
//!
//! A [`DeployedContract`] pairs an address with the ABI it was compiled
//! with. Reads go through `eth_call` and return decoded values; writes go
//! through the full transaction lifecycle and return only the receipt.
//! Arguments are checked against the ABI before anything is sent.

use crate::{
	core::{
		artifact::ContractArtifact,
		blockchain::{Provider, TxBuilder},
	},
	types::error::{Error, Result},
};
use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::{Address, Bytes, TxKind};
use alloy_rpc_types::TransactionReceipt;
use tracing::{debug, info};

/// Creation bytecode followed by ABI-encoded constructor arguments
pub fn deployment_data(artifact: &ContractArtifact, constructor_args: &[DynSolValue]) -> Result<Bytes> {
	if !artifact.is_deployable() {
		return Err(Error::InvalidArtifact(format!(
			"{} has no creation bytecode (abstract contract or interface?)",
			artifact.name
		)));
	}

	let mut data = artifact.bytecode.to_vec();
	match &artifact.abi.constructor {
		Some(constructor) => {
			let encoded = constructor
				.abi_encode_input(constructor_args)
				.map_err(|e| Error::AbiEncoding(format!("constructor: {}", e)))?;
			data.extend_from_slice(&encoded);
		},
		None if !constructor_args.is_empty() => {
			return Err(Error::AbiEncoding(format!(
				"{} has no constructor but {} argument(s) were given",
				artifact.name,
				constructor_args.len()
			)));
		},
		None => {},
	}

	Ok(Bytes::from(data))
}

/// Contract instance on chain
#[derive(Debug, Clone)]
pub struct DeployedContract {
	address: Address,
	abi: JsonAbi,
	provider: Provider,
}

impl DeployedContract {
	pub fn new(address: Address, abi: JsonAbi, provider: Provider) -> Self {
		Self { address, abi, provider }
	}

	/// Deploy an artifact with the given nonce and wait for it to be mined
	///
	/// # Errors
	/// Returns Error::MissingContractAddress if the receipt does not carry
	/// the new contract's address
	pub async fn deploy(
		tx_builder: &TxBuilder,
		nonce: u64,
		artifact: &ContractArtifact,
		constructor_args: &[DynSolValue],
	) -> Result<(Self, TransactionReceipt)> {
		let data = deployment_data(artifact, constructor_args)?;
		info!(contract = %artifact.name, nonce = nonce, bytes = data.len(), "Deploying contract");

		let receipt = tx_builder.send_and_wait(TxKind::Create, data, nonce).await?;
		let address = receipt
			.contract_address
			.ok_or(Error::MissingContractAddress(receipt.transaction_hash))?;

		info!(contract = %artifact.name, address = %address, "Contract deployed");
		let contract = Self::new(address, artifact.abi.clone(), tx_builder.provider().clone());
		Ok((contract, receipt))
	}

	pub fn address(&self) -> Address {
		self.address
	}

	/// Find the function overload matching the number of arguments
	fn function(&self, name: &str, arg_count: usize) -> Result<&Function> {
		let overloads = self
			.abi
			.function(name)
			.ok_or_else(|| Error::FunctionNotFound(name.to_string()))?;

		overloads.iter().find(|f| f.inputs.len() == arg_count).ok_or_else(|| {
			let expected: Vec<String> = overloads.iter().map(|f| f.inputs.len().to_string()).collect();
			Error::AbiEncoding(format!(
				"{} expects {} argument(s), got {}",
				name,
				expected.join(" or "),
				arg_count
			))
		})
	}

	/// ABI-encode a call without sending it
	pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes> {
		let function = self.function(name, args.len())?;
		function
			.abi_encode_input(args)
			.map(Bytes::from)
			.map_err(|e| Error::AbiEncoding(format!("{}: {}", function.signature(), e)))
	}

	/// Simulate a function locally and decode what it returns
	///
	/// Never changes chain state.
	///
	/// # Arguments
	/// * `name` - Function name; overloads are told apart by `args.len()`
	/// * `args` - Typed arguments matching the function's inputs
	///
	/// # Errors
	/// Returns Error::AbiEncoding before any request if the arguments do not
	/// fit the function, Error::AbiDecoding if the returned data does not
	/// match its outputs
	pub async fn call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
		let function = self.function(name, args.len())?;
		let data = self.encode_call(name, args)?;

		let output = self.provider.call(None, self.address, data).await?;
		let decoded = function
			.abi_decode_output(&output)
			.map_err(|e| Error::AbiDecoding(format!("{}: {}", function.signature(), e)))?;

		debug!(function = %function.signature(), outputs = ?decoded, "Call returned");
		Ok(decoded)
	}

	/// Send a state-changing call and wait for it to be mined
	///
	/// Returns only the receipt; read the new state with [`Self::call`].
	///
	/// # Arguments
	/// * `tx_builder` - Builder holding the sender's signer
	/// * `nonce` - Nonce for this transaction, taken from the caller's tracker
	/// * `name` - Function to invoke
	/// * `args` - Typed arguments matching the function's inputs
	pub async fn transact(
		&self,
		tx_builder: &TxBuilder,
		nonce: u64,
		name: &str,
		args: &[DynSolValue],
	) -> Result<TransactionReceipt> {
		let data = self.encode_call(name, args)?;
		info!(function = name, contract = %self.address, nonce = nonce, "Sending transaction");
		tx_builder
			.send_and_wait(TxKind::Call(self.address), data, nonce)
			.await
	}
}
