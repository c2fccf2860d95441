//! Deployment and the store/retrieve interaction
//!
//! Steps (d) and (e) of the pipeline plus the contract calls. The starting
//! nonce is read once; every accepted transaction advances it by one.

use crate::{
	cli::output::Display,
	core::{
		artifact::ContractArtifact,
		blockchain::{NonceTracker, Provider, TxBuilder},
		config::Config,
		contract::DeployedContract,
	},
	operations::PipelineOptions,
	types::{
		chain::ChainId,
		error::{Error, Result},
	},
};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use serde::Serialize;
use tracing::{info, warn};

/// What a pipeline run did on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
	pub chain: ChainId,
	pub address: Address,
	pub deploy_tx: B256,
	pub store_tx: B256,
	pub initial_value: U256,
	pub stored_value: U256,
	pub final_value: U256,
}

/// Deploy the artifact, read the value, store a new one and read it back
///
/// # Arguments
/// * `options` - Supplies the value passed to `store`
/// * `config` - Node endpoint and the sender's credentials
/// * `artifact` - Compiled contract to deploy
///
/// # Returns
/// Addresses, transaction hashes and both `retrieve()` results
///
/// # Errors
/// Stops at the first failure: Error::Rpc when the node is unreachable,
/// Error::Rejected when it refuses a transaction, Error::Reverted when one
/// is mined with failure status
pub async fn deploy_and_interact(
	options: &PipelineOptions,
	config: &Config,
	artifact: &ContractArtifact,
) -> Result<DeploymentReport> {
	let total = options.total_steps();

	let provider = Provider::connect(&config.rpc_url).await?;
	let chain = provider.chain_id().await?;
	Display::kv("node", provider.endpoint().as_str());
	if !chain.is_local() {
		warn!(chain = %chain, "Deploying to a chain that is not a known local test network");
		Display::warning(&format!("Chain {} is not a known local test network", chain));
	}

	let tx_builder = TxBuilder::new(provider.clone(), config.signer()?).with_poll_interval(config.poll_interval);
	let mut nonces = NonceTracker::fetch(&provider, config.address).await?;

	Display::step(4, total, &format!("Deploying {} to {}", artifact.name, chain));
	let (contract, receipt) = DeployedContract::deploy(&tx_builder, nonces.current(), artifact, &[]).await?;
	nonces.advance();
	Display::kv("address", &contract.address().to_string());
	Display::kv("tx", &receipt.transaction_hash.to_string());

	Display::step(5, total, "Calling retrieve()");
	let initial_value = retrieve(&contract).await?;
	Display::kv("retrieve()", &initial_value.to_string());

	Display::step(6, total, &format!("Sending store({})", options.store_value));
	let args = [DynSolValue::Uint(options.store_value, 256)];
	let store_receipt = contract
		.transact(&tx_builder, nonces.current(), "store", &args)
		.await?;
	nonces.advance();
	Display::kv("tx", &store_receipt.transaction_hash.to_string());

	Display::step(7, total, "Calling retrieve()");
	let final_value = retrieve(&contract).await?;
	Display::kv("retrieve()", &final_value.to_string());

	if final_value != options.store_value {
		warn!(expected = %options.store_value, actual = %final_value, "Stored value was not read back");
	}

	info!(
		address = %contract.address(),
		initial = %initial_value,
		stored = %options.store_value,
		final_value = %final_value,
		next_nonce = nonces.current(),
		"Interaction finished"
	);

	Ok(DeploymentReport {
		chain,
		address: contract.address(),
		deploy_tx: receipt.transaction_hash,
		store_tx: store_receipt.transaction_hash,
		initial_value,
		stored_value: options.store_value,
		final_value,
	})
}

/// Read the stored number through `retrieve()`
pub async fn retrieve(contract: &DeployedContract) -> Result<U256> {
	let outputs = contract.call("retrieve", &[]).await?;
	outputs
		.first()
		.and_then(DynSolValue::as_uint)
		.map(|(value, _)| value)
		.ok_or_else(|| Error::AbiDecoding("retrieve() did not return a uint".to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::constants::env_vars;
	use crate::core::mock_node::{receipt_json, MockNode};
	use crate::types::hex::Hex;
	use alloy_json_abi::JsonAbi;
	use alloy_primitives::Bytes;
	use serde_json::json;
	use std::collections::HashMap;

	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	fn artifact() -> ContractArtifact {
		let abi: JsonAbi = serde_json::from_value(json!([
			{
				"inputs": [],
				"name": "retrieve",
				"outputs": [{ "internalType": "uint256", "name": "", "type": "uint256" }],
				"stateMutability": "view",
				"type": "function"
			},
			{
				"inputs": [{ "internalType": "uint256", "name": "_favoriteNumber", "type": "uint256" }],
				"name": "store",
				"outputs": [],
				"stateMutability": "nonpayable",
				"type": "function"
			}
		]))
		.unwrap();

		ContractArtifact {
			name: "SimpleStorage".to_string(),
			abi,
			bytecode: Bytes::from(vec![0x60, 0x80, 0x60, 0x40]),
			source_map: None,
		}
	}

	fn config(rpc_url: String) -> Config {
		let vars: HashMap<&str, String> = [
			(env_vars::RPC_URL, rpc_url),
			(env_vars::MY_ADDRESS, DEV_ADDRESS.to_string()),
			(env_vars::PRIVATE_KEY, DEV_KEY.to_string()),
			(env_vars::POLL_INTERVAL_MS, "10".to_string()),
		]
		.into_iter()
		.collect();
		Config::from_lookup(|k| vars.get(k).cloned()).unwrap()
	}

	fn word(value: u64) -> String {
		Hex::encode(&U256::from(value).to_be_bytes::<32>())
	}

	#[tokio::test]
	async fn test_deploy_store_and_read_back() {
		let deploy_hash = B256::repeat_byte(0xd1);
		let store_hash = B256::repeat_byte(0x51);
		let deployed = Address::repeat_byte(0x77);

		let node = MockNode::new()
			.result("eth_chainId", json!("0x539"))
			.result("eth_getTransactionCount", json!("0x0"))
			.result("eth_gasPrice", json!("0x4a817c800"))
			.result("eth_estimateGas", json!("0x1d4c0"))
			.result("eth_sendRawTransaction", json!(deploy_hash))
			.result("eth_sendRawTransaction", json!(store_hash))
			.result("eth_getTransactionReceipt", receipt_json(deploy_hash, Some(deployed), true))
			.result("eth_getTransactionReceipt", receipt_json(store_hash, None, true))
			.result("eth_call", json!(word(0)))
			.result("eth_call", json!(word(15)));
		let server = node.start().await;

		let options = PipelineOptions::default();
		let report = deploy_and_interact(&options, &config(server.uri()), &artifact())
			.await
			.unwrap();

		assert_eq!(report.chain, ChainId::GANACHE);
		assert_eq!(report.address, deployed);
		assert_eq!(report.deploy_tx, deploy_hash);
		assert_eq!(report.store_tx, store_hash);
		assert_eq!(report.initial_value, U256::ZERO);
		assert_eq!(report.stored_value, U256::from(15));
		assert_eq!(report.final_value, U256::from(15));

		// The nonce is read once and then tracked locally
		assert_eq!(MockNode::count(&server, "eth_getTransactionCount").await, 1);
		assert_eq!(MockNode::count(&server, "eth_sendRawTransaction").await, 2);
	}

	#[tokio::test]
	async fn test_rejected_store_ends_the_run() {
		let deploy_hash = B256::repeat_byte(0xd2);

		let node = MockNode::new()
			.result("eth_chainId", json!("0x539"))
			.result("eth_getTransactionCount", json!("0x0"))
			.result("eth_gasPrice", json!("0x1"))
			.result("eth_estimateGas", json!("0x5208"))
			.result("eth_sendRawTransaction", json!(deploy_hash))
			.error("eth_sendRawTransaction", -32000, "nonce too low")
			.result("eth_getTransactionReceipt", receipt_json(deploy_hash, Some(Address::repeat_byte(0x78)), true))
			.result("eth_call", json!(word(0)));
		let server = node.start().await;

		let err = deploy_and_interact(&PipelineOptions::default(), &config(server.uri()), &artifact())
			.await
			.unwrap_err();

		assert!(matches!(err, Error::Rejected(ref msg) if msg.contains("nonce too low")));
		assert_eq!(MockNode::count(&server, "eth_call").await, 1);
	}
}
