//! Hexadecimal parsing for keys, addresses and bytecode
//!
//! Accepts strings with or without the `0x` prefix, the way compilers,
//! nodes and `.env` files variously write them.

use crate::types::error::{Error, Result};
use alloy_primitives::{Address, Bytes, B256};
use alloy_signer_local::PrivateKeySigner;

/// Utility struct providing hexadecimal conversion functions
pub struct Hex;

impl Hex {
	/// Decode a hexadecimal string to bytes
	///
	/// # Errors
	/// Returns Error::InvalidHex if the string contains invalid hex characters
	pub fn decode(s: &str) -> Result<Bytes> {
		let s = s.trim().trim_start_matches("0x");
		hex::decode(s)
			.map(Into::into)
			.map_err(|e| Error::InvalidHex(format!("{}: {}", s, e)))
	}

	/// Encode bytes to hexadecimal string with 0x prefix
	pub fn encode(bytes: &[u8]) -> String {
		format!("0x{}", hex::encode(bytes))
	}

	/// Parse a private key from hexadecimal string
	///
	/// # Errors
	/// Returns Error::InvalidPrivateKey unless the string is exactly 32 bytes
	/// of hex forming a valid secp256k1 scalar
	pub fn to_private_key(key: &str) -> Result<PrivateKeySigner> {
		let key = key.trim().trim_start_matches("0x");
		let bytes = hex::decode(key).map_err(|_| Error::InvalidPrivateKey)?;

		if bytes.len() != 32 {
			return Err(Error::InvalidPrivateKey);
		}

		PrivateKeySigner::from_bytes(&B256::from_slice(&bytes)).map_err(|_| Error::InvalidPrivateKey)
	}

	/// Parse a 20-byte Ethereum address, checksummed or not
	///
	/// # Errors
	/// Returns Error::InvalidAddress if the string is not a 20-byte hex value
	pub fn to_address(s: &str) -> Result<Address> {
		let trimmed = s.trim();
		let raw = trimmed.trim_start_matches("0x");
		if raw.len() != 40 {
			return Err(Error::InvalidAddress(trimmed.to_string()));
		}
		let bytes = hex::decode(raw).map_err(|e| Error::InvalidAddress(format!("{}: {}", trimmed, e)))?;
		Ok(Address::from_slice(&bytes))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// Anvil's first well-known development account.
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	#[test]
	fn test_hex_decode() {
		let bytes = Hex::decode("0xdeadbeef").unwrap();
		assert_eq!(bytes, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));

		let bytes2 = Hex::decode("deadbeef").unwrap();
		assert_eq!(bytes, bytes2);
	}

	#[test]
	fn test_hex_encode() {
		assert_eq!(Hex::encode(&[0xde, 0xad, 0xbe, 0xef]), "0xdeadbeef");
	}

	#[test]
	fn test_private_key_matches_address() {
		let signer = Hex::to_private_key(DEV_KEY).unwrap();
		assert_eq!(signer.address(), Hex::to_address(DEV_ADDRESS).unwrap());

		// Unprefixed keys are accepted too
		let signer2 = Hex::to_private_key(DEV_KEY.trim_start_matches("0x")).unwrap();
		assert_eq!(signer.address(), signer2.address());
	}

	#[test]
	fn test_invalid_private_key() {
		assert!(matches!(Hex::to_private_key("0x1234"), Err(Error::InvalidPrivateKey)));
		assert!(matches!(Hex::to_private_key("not hex"), Err(Error::InvalidPrivateKey)));
		// Zero is not a valid secp256k1 scalar
		assert!(Hex::to_private_key(&format!("0x{}", "00".repeat(32))).is_err());
	}

	#[test]
	fn test_invalid_address() {
		assert!(Hex::to_address("0x123").is_err());
		assert!(Hex::to_address(&format!("0x{}", "zz".repeat(20))).is_err());
	}
}
