//! Configuration loading from the environment
//!
//! Credentials and the node endpoint come only from environment variables
//! (optionally through a `.env` file). All three are required; a missing or
//! empty value fails immediately, before any network call is attempted.
//!
//! Loading goes through a lookup function so tests can supply values
//! without touching the process environment.

use crate::{
	constants::{self, env_vars},
	types::{
		error::{Error, Result},
		hex::Hex,
		secret::SecretString,
	},
};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use semver::Version;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Node endpoint and account credentials for on-chain steps
#[derive(Debug, Clone)]
pub struct Config {
	pub rpc_url: Url,
	pub address: Address,
	private_key: SecretString,
	pub poll_interval: Duration,
}

impl Config {
	/// Load configuration from the process environment
	///
	/// A `.env` file is not read here; the binary loads it once at startup.
	///
	/// # Errors
	/// Returns Error::MissingConfig for the first required variable that is
	/// unset or empty, or a validation error for malformed values
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Load configuration through an arbitrary key lookup
	///
	/// # Arguments
	/// * `lookup` - Returns the raw value of a key, `None` when unset
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |key: &'static str| -> Result<String> {
			lookup(key)
				.map(|v| v.trim().to_string())
				.filter(|v| !v.is_empty())
				.ok_or(Error::MissingConfig(key))
		};

		// Presence first, so a missing key is reported even if another value is malformed
		let rpc_url = required(env_vars::RPC_URL)?;
		let address = required(env_vars::MY_ADDRESS)?;
		let private_key = SecretString::from(required(env_vars::PRIVATE_KEY)?);

		let rpc_url = Url::parse(&rpc_url)
			.map_err(|e| Error::InvalidConfig(format!("{} is not a valid URL: {}", env_vars::RPC_URL, e)))?;
		if !matches!(rpc_url.scheme(), "http" | "https") {
			return Err(Error::InvalidConfig(format!(
				"{} must be an http(s) endpoint, got {}",
				env_vars::RPC_URL,
				rpc_url.scheme()
			)));
		}

		let address = Hex::to_address(&address)?;

		let signer = Hex::to_private_key(private_key.expose_secret())?;
		if signer.address() != address {
			return Err(Error::InvalidConfig(format!(
				"{} does not belong to {} (key controls {})",
				env_vars::PRIVATE_KEY,
				address,
				signer.address()
			)));
		}

		let poll_interval = match lookup(env_vars::POLL_INTERVAL_MS) {
			Some(raw) if !raw.trim().is_empty() => {
				let ms: u64 = raw.trim().parse().map_err(|_| {
					Error::InvalidConfig(format!("{} must be an integer, got {}", env_vars::POLL_INTERVAL_MS, raw))
				})?;
				if ms == 0 {
					return Err(Error::InvalidConfig(format!(
						"{} must be greater than zero",
						env_vars::POLL_INTERVAL_MS
					)));
				}
				Duration::from_millis(ms)
			},
			_ => Duration::from_millis(constants::DEFAULT_POLL_INTERVAL_MS),
		};

		Ok(Self {
			rpc_url,
			address,
			private_key,
			poll_interval,
		})
	}

	/// Build the local signer for this account
	pub fn signer(&self) -> Result<PrivateKeySigner> {
		Hex::to_private_key(self.private_key.expose_secret())
	}
}

/// Settings for locating or installing the pinned compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
	pub version: Version,
	pub solc_path: Option<PathBuf>,
	pub install_dir: PathBuf,
	pub binaries_url: String,
}

impl CompilerConfig {
	/// Compiler settings for a version, with path overrides from the environment
	pub fn from_env(version: &str) -> Result<Self> {
		Self::from_lookup(version, |key| env::var(key).ok())
	}

	pub fn from_lookup<F>(version: &str, lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let version = Version::parse(version.trim().trim_start_matches('v'))
			.map_err(|e| Error::InvalidConfig(format!("Invalid solc version {}: {}", version, e)))?;

		let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

		let solc_path = non_empty(env_vars::SOLC_PATH).map(PathBuf::from);

		let install_dir = non_empty(env_vars::SOLC_INSTALL_DIR)
			.map(PathBuf::from)
			.or_else(|| {
				non_empty("HOME")
					.or_else(|| non_empty("USERPROFILE"))
					.map(|home| PathBuf::from(home).join(constants::SOLC_INSTALL_SUBDIR))
			})
			.unwrap_or_else(|| PathBuf::from(".solc"));

		Ok(Self {
			version,
			solc_path,
			install_dir,
			binaries_url: constants::SOLC_BINARIES_URL.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
	}

	fn complete() -> HashMap<String, String> {
		vars(&[
			(env_vars::RPC_URL, "http://127.0.0.1:8545"),
			(env_vars::MY_ADDRESS, DEV_ADDRESS),
			(env_vars::PRIVATE_KEY, DEV_KEY),
		])
	}

	fn load(map: &HashMap<String, String>) -> Result<Config> {
		Config::from_lookup(|k| map.get(k).cloned())
	}

	#[test]
	fn test_complete_config() {
		let config = load(&complete()).unwrap();
		assert_eq!(config.rpc_url.as_str(), "http://127.0.0.1:8545/");
		assert_eq!(config.address, Hex::to_address(DEV_ADDRESS).unwrap());
		assert_eq!(config.poll_interval, Duration::from_millis(1000));
		assert_eq!(config.signer().unwrap().address(), config.address);
	}

	#[test]
	fn test_each_required_value_is_reported() {
		for key in [env_vars::RPC_URL, env_vars::MY_ADDRESS, env_vars::PRIVATE_KEY] {
			let mut map = complete();
			map.remove(key);
			match load(&map) {
				Err(Error::MissingConfig(missing)) => assert_eq!(missing, key),
				other => panic!("expected missing {}, got {:?}", key, other),
			}
		}
	}

	#[test]
	fn test_empty_value_counts_as_missing() {
		let mut map = complete();
		map.insert(env_vars::PRIVATE_KEY.to_string(), "   ".to_string());
		assert!(matches!(load(&map), Err(Error::MissingConfig(env_vars::PRIVATE_KEY))));
	}

	#[test]
	fn test_missing_reported_before_malformed() {
		let mut map = complete();
		map.insert(env_vars::RPC_URL.to_string(), "not a url".to_string());
		map.remove(env_vars::PRIVATE_KEY);
		assert!(matches!(load(&map), Err(Error::MissingConfig(env_vars::PRIVATE_KEY))));
	}

	#[test]
	fn test_key_must_match_address() {
		let mut map = complete();
		map.insert(
			env_vars::MY_ADDRESS.to_string(),
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
		);
		assert!(matches!(load(&map), Err(Error::InvalidConfig(_))));
	}

	#[test]
	fn test_rejects_non_http_endpoint() {
		let mut map = complete();
		map.insert(env_vars::RPC_URL.to_string(), "ws://127.0.0.1:8545".to_string());
		assert!(matches!(load(&map), Err(Error::InvalidConfig(_))));
	}

	#[test]
	fn test_poll_interval_override() {
		let mut map = complete();
		map.insert(env_vars::POLL_INTERVAL_MS.to_string(), "250".to_string());
		assert_eq!(load(&map).unwrap().poll_interval, Duration::from_millis(250));

		map.insert(env_vars::POLL_INTERVAL_MS.to_string(), "0".to_string());
		assert!(load(&map).is_err());
	}

	#[test]
	fn test_debug_does_not_leak_key() {
		let config = load(&complete()).unwrap();
		let printed = format!("{:?}", config);
		assert!(!printed.contains(DEV_KEY.trim_start_matches("0x")));
	}

	#[test]
	fn test_compiler_config_defaults() {
		let map = vars(&[("HOME", "/home/dev")]);
		let config = CompilerConfig::from_lookup("0.8.8", |k| map.get(k).cloned()).unwrap();
		assert_eq!(config.version, Version::new(0, 8, 8));
		assert_eq!(config.solc_path, None);
		assert_eq!(config.install_dir, PathBuf::from("/home/dev/.simple-storage/solc"));
	}

	#[test]
	fn test_compiler_config_overrides() {
		let map = vars(&[
			(env_vars::SOLC_PATH, "/usr/bin/solc"),
			(env_vars::SOLC_INSTALL_DIR, "/opt/solc"),
		]);
		let config = CompilerConfig::from_lookup("v0.8.19", |k| map.get(k).cloned()).unwrap();
		assert_eq!(config.version, Version::new(0, 8, 19));
		assert_eq!(config.solc_path, Some(PathBuf::from("/usr/bin/solc")));
		assert_eq!(config.install_dir, PathBuf::from("/opt/solc"));
	}

	#[test]
	fn test_invalid_compiler_version() {
		assert!(CompilerConfig::from_lookup("latest", |_| None).is_err());
	}
}
