//! Error types and result handling for the deploy pipeline
//!
//! Every stage of the pipeline reports failures through the single [`Error`]
//! enum below. Variants are grouped by the stage that raises them so the
//! caller can tell a configuration problem from a compiler diagnostic or a
//! node rejection. Nothing is retried; every error ends the run.

use alloy_primitives::B256;
use std::path::PathBuf;

/// Convenience Result type alias using the local Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all pipeline operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
	// Configuration errors
	#[error("Missing configuration: {0} is not set")]
	MissingConfig(&'static str),

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("Invalid private key")]
	InvalidPrivateKey,

	#[error("Invalid address: {0}")]
	InvalidAddress(String),

	#[error("Invalid hex string: {0}")]
	InvalidHex(String),

	// Compilation errors
	#[error("Contract source not found: {0}")]
	SourceNotFound(PathBuf),

	#[error("Compiler not found: {0}")]
	CompilerNotFound(String),

	#[error("Failed to install solc {version}: {reason}")]
	CompilerInstallFailed { version: String, reason: String },

	#[error("Compiler version mismatch: expected {expected}, found {found}")]
	CompilerVersionMismatch { expected: String, found: String },

	#[error("Compilation failed:\n{0}")]
	Compilation(String),

	#[error("Contract {contract} not found in {file}")]
	ContractNotFound { file: String, contract: String },

	#[error("Invalid compilation artifact: {0}")]
	InvalidArtifact(String),

	// Network errors
	#[error("RPC request failed: {0}")]
	Rpc(String),

	// Chain errors
	#[error("Transaction rejected by node: {0}")]
	Rejected(String),

	#[error("Transaction {0} reverted")]
	Reverted(B256),

	#[error("Deployment receipt {0} has no contract address")]
	MissingContractAddress(B256),

	#[error("Function not found in ABI: {0}")]
	FunctionNotFound(String),

	#[error("ABI encoding failed: {0}")]
	AbiEncoding(String),

	#[error("ABI decoding failed: {0}")]
	AbiDecoding(String),

	#[error("Signing failed: {0}")]
	SigningFailed(String),

	// IO errors
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	// JSON errors
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	// HTTP errors
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
}

impl Error {
	/// Classify a transport error from the node
	///
	/// A JSON-RPC error response means the node received and refused the
	/// request (bad nonce, underpriced, execution reverted); everything else
	/// is a connection or framing problem.
	pub fn from_transport(context: &str, err: alloy_transport::TransportError) -> Self {
		match err.as_error_resp() {
			Some(payload) => Error::Rejected(format!("{}: {}", context, payload.message)),
			None => Error::Rpc(format!("{}: {}", context, err)),
		}
	}

	/// True for errors returned by the node for a well-formed request
	pub fn is_rejection(&self) -> bool {
		matches!(self, Error::Rejected(_) | Error::Reverted(_))
	}
}
