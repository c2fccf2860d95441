//! Node access and the transaction lifecycle
//!
//! Every on-chain operation goes through the same four steps, each with its
//! own type so a step cannot be skipped:
//!
//! [`BuiltTx`] → [`SignedTx`] → [`SubmittedTx`] → mined `TransactionReceipt`
//!
//! Chain id and gas price are read from the node each time a transaction is
//! built. The nonce is never looked up here: the caller passes it in and
//! advances its [`NonceTracker`] after each successful submission. Waiting
//! for a receipt has no timeout.

use crate::types::{
	chain::ChainId,
	error::{Error, Result},
};
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::{ReceiptResponse, TxSigner};
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_provider::{DynProvider, Provider as AlloyProvider, ProviderBuilder};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// JSON-RPC connection to an Ethereum node
#[derive(Clone)]
pub struct Provider {
	inner: DynProvider,
	endpoint: Url,
}

impl std::fmt::Debug for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("endpoint", &self.endpoint.as_str())
			.field("inner", &"<dyn AlloyProvider>")
			.finish()
	}
}

impl Provider {
	/// Connect to a node over HTTP
	///
	/// Issues one `eth_chainId` request to make sure the endpoint answers.
	///
	/// # Errors
	/// Returns Error::Rpc if the node cannot be reached
	pub async fn connect(endpoint: &Url) -> Result<Self> {
		let inner = ProviderBuilder::new().connect_http(endpoint.clone()).erased();
		let provider = Self {
			inner,
			endpoint: endpoint.clone(),
		};

		let chain = provider
			.chain_id()
			.await
			.map_err(|e| Error::Rpc(format!("Failed to connect to {}: {}", endpoint, e)))?;
		info!(endpoint = %endpoint, chain = %chain, "Connected to node");

		Ok(provider)
	}

	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	pub async fn chain_id(&self) -> Result<ChainId> {
		self.inner
			.get_chain_id()
			.await
			.map(ChainId::new)
			.map_err(|e| Error::from_transport("Failed to get chain id", e))
	}

	pub async fn gas_price(&self) -> Result<u128> {
		self.inner
			.get_gas_price()
			.await
			.map_err(|e| Error::from_transport("Failed to get gas price", e))
	}

	/// Number of transactions sent from an account, i.e. its next nonce
	pub async fn transaction_count(&self, address: Address) -> Result<u64> {
		self.inner
			.get_transaction_count(address)
			.await
			.map_err(|e| Error::from_transport("Failed to get transaction count", e))
	}

	pub async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64> {
		self.inner
			.estimate_gas(request)
			.await
			.map_err(|e| Error::from_transport("Failed to estimate gas", e))
	}

	/// Simulate a call against the latest block
	pub async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes> {
		let mut request = TransactionRequest::default().to(to).input(data.into());
		request.from = from;

		self.inner
			.call(request)
			.await
			.map_err(|e| Error::from_transport("Contract call failed", e))
	}

	/// Broadcast a signed transaction and return the hash reported by the node
	pub async fn send_raw(&self, raw: &[u8]) -> Result<B256> {
		let pending = self
			.inner
			.send_raw_transaction(raw)
			.await
			.map_err(|e| Error::from_transport("Failed to send transaction", e))?;
		Ok(*pending.tx_hash())
	}

	pub async fn receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
		self.inner
			.get_transaction_receipt(hash)
			.await
			.map_err(|e| Error::from_transport("Failed to get receipt", e))
	}
}

/// Manually tracked account nonce
///
/// Seeded once from the node, then advanced by the caller after each
/// accepted submission. A dropped transaction is not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceTracker {
	next: u64,
}

impl NonceTracker {
	pub fn new(start: u64) -> Self {
		Self { next: start }
	}

	/// Seed the tracker from the account's current transaction count
	pub async fn fetch(provider: &Provider, address: Address) -> Result<Self> {
		let start = provider.transaction_count(address).await?;
		debug!(address = %address, nonce = start, "Fetched starting nonce");
		Ok(Self::new(start))
	}

	/// Nonce for the next transaction
	pub fn current(&self) -> u64 {
		self.next
	}

	/// Move past a nonce that has been used
	pub fn advance(&mut self) {
		self.next += 1;
	}
}

/// Unsigned transaction with every field filled in
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTx {
	pub from: Address,
	pub tx: TxLegacy,
}

impl BuiltTx {
	pub fn chain_id(&self) -> Option<u64> {
		self.tx.chain_id
	}

	pub fn nonce(&self) -> u64 {
		self.tx.nonce
	}

	pub fn is_create(&self) -> bool {
		self.tx.to.is_create()
	}
}

/// Signed transaction ready to broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
	pub hash: B256,
	pub nonce: u64,
	/// EIP-2718 encoded bytes as sent in `eth_sendRawTransaction`
	pub raw: Bytes,
}

/// Transaction accepted by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedTx {
	pub hash: B256,
	pub nonce: u64,
}

/// Builds, signs, submits and waits for transactions from one account
#[derive(Debug, Clone)]
pub struct TxBuilder {
	provider: Provider,
	signer: PrivateKeySigner,
	poll_interval: Duration,
}

impl TxBuilder {
	pub fn new(provider: Provider, signer: PrivateKeySigner) -> Self {
		Self {
			provider,
			signer,
			poll_interval: Duration::from_secs(1),
		}
	}

	/// Set how often the receipt is polled
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	pub fn provider(&self) -> &Provider {
		&self.provider
	}

	pub fn sender(&self) -> Address {
		self.signer.address()
	}

	/// Populate a legacy transaction from fresh node state
	///
	/// # Arguments
	/// * `to` - `TxKind::Create` for deployments, the contract address otherwise
	/// * `input` - Creation bytecode or encoded call data
	/// * `nonce` - Nonce chosen by the caller
	///
	/// # Errors
	/// Returns Error::Rejected if the node refuses to estimate (for example
	/// because execution would revert), Error::Rpc on transport failures
	pub async fn build(&self, to: TxKind, input: Bytes, nonce: u64) -> Result<BuiltTx> {
		let from = self.sender();
		let chain = self.provider.chain_id().await?;
		let gas_price = self.provider.gas_price().await?;

		let request = TransactionRequest {
			from: Some(from),
			to: Some(to),
			input: input.clone().into(),
			nonce: Some(nonce),
			gas_price: Some(gas_price),
			..Default::default()
		};
		let gas_limit = self.provider.estimate_gas(request).await?;

		debug!(
			chain = %chain,
			nonce = nonce,
			gas_price = gas_price,
			gas_limit = gas_limit,
			create = to.is_create(),
			"Built transaction"
		);

		Ok(BuiltTx {
			from,
			tx: TxLegacy {
				chain_id: Some(chain.id()),
				nonce,
				gas_price,
				gas_limit,
				to,
				value: U256::ZERO,
				input,
			},
		})
	}

	/// Sign locally; no network access
	pub async fn sign(&self, built: BuiltTx) -> Result<SignedTx> {
		if built.from != self.sender() {
			return Err(Error::SigningFailed(format!(
				"transaction is from {} but signer is {}",
				built.from,
				self.sender()
			)));
		}

		let chain_id = built.chain_id();
		let create = built.is_create();
		let nonce = built.nonce();

		let mut tx = built.tx;
		let signature = self
			.signer
			.sign_transaction(&mut tx)
			.await
			.map_err(|e| Error::SigningFailed(e.to_string()))?;

		let envelope = TxEnvelope::from(tx.into_signed(signature));
		let hash = *envelope.tx_hash();
		let raw = Bytes::from(envelope.encoded_2718());

		debug!(
			tx_hash = %hash,
			nonce = nonce,
			chain_id = ?chain_id,
			create = create,
			"Signed transaction"
		);
		Ok(SignedTx { hash, nonce, raw })
	}

	/// Broadcast a signed transaction
	///
	/// # Errors
	/// Returns Error::Rejected with the node's message if it refuses the
	/// transaction (nonce too low, already known, underpriced)
	pub async fn submit(&self, signed: SignedTx) -> Result<SubmittedTx> {
		let hash = self.provider.send_raw(&signed.raw).await?;
		if hash != signed.hash {
			warn!(local = %signed.hash, node = %hash, "Node reported a different transaction hash");
		}

		info!(tx_hash = %hash, nonce = signed.nonce, "Transaction submitted");
		Ok(SubmittedTx {
			hash,
			nonce: signed.nonce,
		})
	}

	/// Poll until the transaction is mined
	///
	/// There is no timeout: if the transaction never gets mined this waits
	/// until the process is stopped.
	///
	/// # Errors
	/// Returns Error::Reverted if the transaction was mined with failure status
	pub async fn wait(&self, submitted: SubmittedTx) -> Result<TransactionReceipt> {
		let mut polls: u64 = 0;
		loop {
			if let Some(receipt) = self.provider.receipt(submitted.hash).await? {
				info!(
					tx_hash = %submitted.hash,
					block = receipt.block_number.unwrap_or_default(),
					gas_used = receipt.gas_used,
					status = receipt.status(),
					"Transaction mined"
				);

				if !receipt.status() {
					return Err(Error::Reverted(submitted.hash));
				}
				return Ok(receipt);
			}

			polls += 1;
			if polls % 30 == 0 {
				debug!(tx_hash = %submitted.hash, polls = polls, "Still waiting for receipt");
			}
			tokio::time::sleep(self.poll_interval).await;
		}
	}

	/// Run the whole lifecycle for one transaction
	pub async fn send_and_wait(&self, to: TxKind, input: Bytes, nonce: u64) -> Result<TransactionReceipt> {
		let built = self.build(to, input, nonce).await?;
		let signed = self.sign(built).await?;
		let submitted = self.submit(signed).await?;
		self.wait(submitted).await
	}
}
