//! Locating and installing the pinned `solc` binary
//!
//! Resolution order: an explicit `SOLC_PATH`, a binary previously installed
//! in the managed directory, a `solc` on `PATH` reporting the right version,
//! and finally a fresh download from the official binary mirror. Downloads
//! are checked against the keccak256 digest published in the mirror's
//! `list.json` before being made executable.

use crate::{
	core::config::CompilerConfig,
	types::{
		error::{Error, Result},
		hex::Hex,
	},
};
use alloy_primitives::keccak256;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};
use which::which;

/// A `solc` binary whose version has been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solc {
	pub path: PathBuf,
	pub version: Version,
}

impl Solc {
	/// Find or install the compiler requested by the configuration
	///
	/// The host platform is only needed for a download, so an installed or
	/// `PATH` compiler works on hosts without official builds.
	///
	/// # Arguments
	/// * `config` - Pinned version, optional explicit path and install directory
	///
	/// # Errors
	/// Returns Error::CompilerNotFound if an explicit path does not exist,
	/// Error::CompilerVersionMismatch if an explicit or managed binary reports
	/// another version, and Error::CompilerInstallFailed if the download fails
	pub async fn resolve(config: &CompilerConfig) -> Result<Self> {
		let expected = &config.version;

		if let Some(path) = &config.solc_path {
			if !path.exists() {
				return Err(Error::CompilerNotFound(path.display().to_string()));
			}
			return Self::checked(path, expected).await;
		}

		let managed = managed_path(&config.install_dir, expected, cfg!(windows));
		if managed.exists() {
			match Self::checked(&managed, expected).await {
				Ok(solc) => {
					debug!(path = %managed.display(), "Using managed solc");
					return Ok(solc);
				},
				// Unrunnable leftover, replaced by a fresh download below
				Err(Error::CompilerNotFound(reason)) => {
					warn!(path = %managed.display(), reason = %reason, "Managed solc is broken, reinstalling");
				},
				Err(e) => return Err(e),
			}
		}

		if let Ok(on_path) = which("solc") {
			match Self::version_of(&on_path).await {
				Ok(found) if same_release(&found, expected) => {
					debug!(path = %on_path.display(), "Using solc from PATH");
					return Ok(Self {
						path: on_path,
						version: found,
					});
				},
				Ok(found) => {
					debug!(path = %on_path.display(), found = %found, expected = %expected, "Ignoring solc on PATH");
				},
				Err(e) => debug!(error = %e, "Ignoring unusable solc on PATH"),
			}
		}

		info!(version = %expected, "solc not installed, downloading");
		let path = SolcInstaller::new(config)?.install(expected).await?;
		Self::checked(&path, expected).await
	}

	async fn checked(path: &Path, expected: &Version) -> Result<Self> {
		let found = Self::version_of(path).await?;
		if !same_release(&found, expected) {
			return Err(Error::CompilerVersionMismatch {
				expected: expected.to_string(),
				found: found.to_string(),
			});
		}
		Ok(Self {
			path: path.to_path_buf(),
			version: found,
		})
	}

	/// Ask a binary for its version
	pub async fn version_of(path: &Path) -> Result<Version> {
		let output = Command::new(path)
			.arg("--version")
			.stdin(Stdio::null())
			.output()
			.await
			.map_err(|e| Error::CompilerNotFound(format!("{}: {}", path.display(), e)))?;

		if !output.status.success() {
			return Err(Error::CompilerNotFound(format!(
				"{} --version exited with {}",
				path.display(),
				output.status
			)));
		}

		parse_version_output(&String::from_utf8_lossy(&output.stdout))
	}

	/// Run the compiler in standard-JSON mode
	///
	/// Returns the raw JSON the compiler printed. Diagnostics inside that
	/// JSON are left to the caller; only a crash or unparseable output is an
	/// error here.
	pub async fn compile_standard_json(&self, input: &serde_json::Value) -> Result<serde_json::Value> {
		let mut child = Command::new(&self.path)
			.arg("--standard-json")
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| Error::CompilerNotFound(format!("{}: {}", self.path.display(), e)))?;

		let payload = serde_json::to_vec(input)?;
		if let Some(mut stdin) = child.stdin.take() {
			stdin.write_all(&payload).await?;
			// Dropping stdin closes the pipe so solc starts compiling
		}

		let output = child.wait_with_output().await?;
		let stdout = String::from_utf8_lossy(&output.stdout);

		if stdout.trim().is_empty() {
			return Err(Error::Compilation(format!(
				"solc exited with {}: {}",
				output.status,
				String::from_utf8_lossy(&output.stderr).trim()
			)));
		}

		serde_json::from_str(&stdout)
			.map_err(|e| Error::Compilation(format!("solc produced invalid JSON: {}", e)))
	}
}

/// Extract the version from `solc --version` output
///
/// The relevant line looks like `Version: 0.8.8+commit.dddeac2f.Linux.g++`.
pub fn parse_version_output(output: &str) -> Result<Version> {
	let raw = output
		.lines()
		.find_map(|line| line.trim().strip_prefix("Version:"))
		.map(str::trim)
		.ok_or_else(|| Error::CompilerNotFound(format!("unrecognised solc version output: {}", output.trim())))?;

	let release = raw.split('+').next().unwrap_or(raw);
	Version::parse(release).map_err(|e| Error::CompilerNotFound(format!("unrecognised solc version {}: {}", raw, e)))
}

fn same_release(found: &Version, expected: &Version) -> bool {
	(found.major, found.minor, found.patch) == (expected.major, expected.minor, expected.patch)
}

/// Subset of the mirror's `list.json`
#[derive(Debug, Deserialize)]
struct BinaryList {
	builds: Vec<BinaryBuild>,
	releases: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct BinaryBuild {
	path: String,
	keccak256: String,
}

/// Downloads compiler releases into the managed directory
#[derive(Debug, Clone)]
pub struct SolcInstaller {
	client: reqwest::Client,
	base_url: String,
	platform: &'static str,
	install_dir: PathBuf,
}

impl SolcInstaller {
	/// Installer for the host platform
	///
	/// # Errors
	/// Returns Error::CompilerInstallFailed on platforms without official builds
	pub fn new(config: &CompilerConfig) -> Result<Self> {
		let platform = host_platform().ok_or_else(|| Error::CompilerInstallFailed {
			version: config.version.to_string(),
			reason: format!(
				"no official solc builds for {}-{}",
				std::env::consts::OS,
				std::env::consts::ARCH
			),
		})?;
		Ok(Self::with_platform(config, platform))
	}

	pub fn with_platform(config: &CompilerConfig, platform: &'static str) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: config.binaries_url.trim_end_matches('/').to_string(),
			platform,
			install_dir: config.install_dir.clone(),
		}
	}

	/// Where a given version lives once installed
	pub fn installed_path(&self, version: &Version) -> PathBuf {
		managed_path(&self.install_dir, version, self.platform.starts_with("windows"))
	}

	/// Download, verify and install a release
	///
	/// # Arguments
	/// * `version` - Exact release to fetch from the mirror
	///
	/// # Returns
	/// Path of the installed, executable binary
	///
	/// # Errors
	/// Returns Error::CompilerInstallFailed if the release is unknown or the
	/// download does not match its published keccak256
	pub async fn install(&self, version: &Version) -> Result<PathBuf> {
		let fail = |reason: String| Error::CompilerInstallFailed {
			version: version.to_string(),
			reason,
		};

		let list_url = format!("{}/{}/list.json", self.base_url, self.platform);
		debug!(url = %list_url, "Fetching solc release list");
		let list: BinaryList = self
			.client
			.get(&list_url)
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;

		let file_name = list
			.releases
			.get(&version.to_string())
			.ok_or_else(|| fail(format!("no release for {} in {}", self.platform, list_url)))?;

		let build = list
			.builds
			.iter()
			.find(|b| &b.path == file_name)
			.ok_or_else(|| fail(format!("release {} missing from build list", file_name)))?;
		let expected_digest = Hex::decode(&build.keccak256)?;

		let binary_url = format!("{}/{}/{}", self.base_url, self.platform, file_name);
		info!(url = %binary_url, "Downloading solc");
		let bytes = self
			.client
			.get(&binary_url)
			.send()
			.await?
			.error_for_status()?
			.bytes()
			.await?;

		let digest = keccak256(&bytes);
		if digest.as_slice() != expected_digest.as_ref() {
			return Err(fail(format!(
				"checksum mismatch: expected {}, got {}",
				build.keccak256, digest
			)));
		}

		tokio::fs::create_dir_all(&self.install_dir).await?;
		let target = self.installed_path(version);

		// Only a complete, executable binary ever appears at the target path
		let mut staged = tempfile::NamedTempFile::new_in(&self.install_dir)?;
		staged.write_all(&bytes)?;
		staged.as_file().sync_all()?;
		make_executable(staged.path())?;
		staged.persist(&target).map_err(|e| Error::Io(e.error))?;

		info!(path = %target.display(), "Installed solc");
		Ok(target)
	}
}

fn host_platform() -> Option<&'static str> {
	match (std::env::consts::OS, std::env::consts::ARCH) {
		("linux", "x86_64") => Some("linux-amd64"),
		// Apple silicon runs the amd64 build under Rosetta
		("macos", "x86_64" | "aarch64") => Some("macosx-amd64"),
		("windows", "x86_64") => Some("windows-amd64"),
		_ => None,
	}
}

/// `solc-v<version>` inside the managed directory
fn managed_path(install_dir: &Path, version: &Version, windows: bool) -> PathBuf {
	let name = if windows {
		format!("solc-v{}.exe", version)
	} else {
		format!("solc-v{}", version)
	};
	install_dir.join(name)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
	use std::os::unix::fs::PermissionsExt;
	std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
	Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
	Ok(())
}
