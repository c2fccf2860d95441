//! Source loading and the standard-JSON compiler invocation
//!
//! The compiler is driven through solc's standard-JSON interface with a
//! single in-memory source. Diagnostics of severity `error` fail the run and
//! are returned exactly as solc formatted them; warnings are only logged.

use crate::{
	constants,
	core::{artifact::CompilerOutput, solc::Solc},
	types::error::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info, warn};

/// Contract source read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
	/// Key used for the source in the compiler input and output
	pub name: String,
	pub content: String,
}

impl SourceFile {
	/// Read a contract source file
	///
	/// The file name (without directories) becomes the source key, so
	/// `./contracts/SimpleStorage.sol` compiles as `SimpleStorage.sol`.
	pub async fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			return Err(Error::SourceNotFound(path.to_path_buf()));
		}

		let name = path
			.file_name()
			.and_then(|n| n.to_str())
			.ok_or_else(|| Error::InvalidConfig(format!("Invalid source path: {}", path.display())))?
			.to_string();

		let content = tokio::fs::read_to_string(path).await?;
		debug!(source = %name, bytes = content.len(), "Loaded contract source");

		Ok(Self { name, content })
	}
}

/// One diagnostic entry from the compiler output
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub severity: String,
	pub message: String,
	#[serde(default)]
	pub formatted_message: Option<String>,
}

impl Diagnostic {
	pub fn is_error(&self) -> bool {
		self.severity.eq_ignore_ascii_case("error")
	}

	/// The compiler's own rendering, falling back to the bare message
	pub fn render(&self) -> &str {
		self.formatted_message.as_deref().unwrap_or(&self.message)
	}
}

/// Build the standard-JSON input for a single source
pub fn standard_json_input(source: &SourceFile) -> serde_json::Value {
	json!({
		"language": "Solidity",
		"sources": {
			source.name.as_str(): { "content": source.content }
		},
		"settings": {
			"outputSelection": {
				"*": { "*": constants::OUTPUT_SELECTION }
			}
		}
	})
}

/// Compiler invoker bound to a resolved `solc`
#[derive(Debug, Clone)]
pub struct Compiler {
	solc: Solc,
}

impl Compiler {
	pub fn new(solc: Solc) -> Self {
		Self { solc }
	}

	pub fn solc(&self) -> &Solc {
		&self.solc
	}

	/// Compile a source and return the full compiler output
	///
	/// # Errors
	/// Returns Error::Compilation with every error diagnostic verbatim if the
	/// source does not compile
	pub async fn compile(&self, source: &SourceFile) -> Result<CompilerOutput> {
		info!(source = %source.name, solc = %self.solc.version, "Compiling contract");

		let input = standard_json_input(source);
		let output = self.solc.compile_standard_json(&input).await?;

		check_diagnostics(&output)?;

		Ok(CompilerOutput::new(output))
	}
}

/// Fail on error diagnostics, log the rest
pub fn check_diagnostics(output: &serde_json::Value) -> Result<()> {
	let diagnostics: Vec<Diagnostic> = match output.get("errors") {
		Some(errors) => serde_json::from_value(errors.clone())?,
		None => Vec::new(),
	};

	let mut failures = Vec::new();
	for diagnostic in &diagnostics {
		if diagnostic.is_error() {
			failures.push(diagnostic.render());
		} else {
			warn!(severity = %diagnostic.severity, "{}", diagnostic.message);
		}
	}

	if failures.is_empty() {
		Ok(())
	} else {
		Err(Error::Compilation(failures.concat()))
	}
}
