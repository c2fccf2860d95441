//! Chain identifier reported by the node
//!
//! The chain id is read from the node every time a transaction is built and
//! is only wrapped here for display and EIP-155 signing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric chain id with names for the usual local development chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
	/// Chain id used by Ganache
	pub const GANACHE: ChainId = ChainId(1337);

	/// Chain id used by Anvil and Hardhat
	pub const ANVIL: ChainId = ChainId(31337);

	pub fn new(id: u64) -> Self {
		Self(id)
	}

	/// Get the numeric chain identifier
	pub fn id(&self) -> u64 {
		self.0
	}

	/// Human-readable name for the chain
	pub fn name(&self) -> &str {
		match self.0 {
			1 => "Ethereum Mainnet",
			1337 => "Ganache",
			31337 => "Anvil",
			5777 => "Ganache UI",
			11155111 => "Sepolia",
			_ => "Custom Chain",
		}
	}

	/// Whether the chain is one of the known local development chains
	pub fn is_local(&self) -> bool {
		matches!(self.0, 1337 | 31337 | 5777)
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.0, self.name())
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

impl From<ChainId> for u64 {
	fn from(chain: ChainId) -> Self {
		chain.0
	}
}
