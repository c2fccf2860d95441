//! Constants and default values used throughout the deploy tool
//!
//! Default file locations, the pinned compiler version, the compiler
//! download mirror and the environment variable names read by the
//! configuration loader.

/// Contract source read by default, relative to the working directory
pub const DEFAULT_SOURCE_PATH: &str = "./SimpleStorage.sol";

/// Where the full compiler output is written, relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "./compiled_code.json";

/// Contract deployed by default
pub const DEFAULT_CONTRACT_NAME: &str = "SimpleStorage";

/// Compiler version the contract is pinned to
pub const DEFAULT_SOLC_VERSION: &str = "0.8.8";

/// Value written by `store` when none is given on the command line
pub const DEFAULT_STORE_VALUE: u64 = 15;

/// Receipt polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Official solc binary mirror
pub const SOLC_BINARIES_URL: &str = "https://binaries.soliditylang.org";

/// Managed compiler directory, relative to the home directory
pub const SOLC_INSTALL_SUBDIR: &str = ".simple-storage/solc";

/// Output selection requested from the compiler for every contract
pub const OUTPUT_SELECTION: [&str; 4] = ["abi", "metadata", "evm.bytecode", "evm.bytecode.sourceMap"];

/// Environment variable names
pub mod env_vars {
	pub const RPC_URL: &str = "RPC_URL";
	pub const MY_ADDRESS: &str = "MY_ADDRESS";
	pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
	pub const POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";
	pub const SOLC_VERSION: &str = "SOLC_VERSION";
	pub const SOLC_PATH: &str = "SOLC_PATH";
	pub const SOLC_INSTALL_DIR: &str = "SOLC_INSTALL_DIR";
}
