//! Logging setup and operation helpers
//!
//! User-facing lines go to the terminal through [`Display`]; the same events
//! are recorded as structured `tracing` records for debugging.

use crate::cli::output::Display;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize structured logging
///
/// `RUST_LOG` takes precedence. Otherwise this crate logs at `info` (or
/// `debug` with `debug = true`) and everything else at `warn`.
///
/// # Arguments
/// * `debug` - Raise this crate's default level to `debug`
pub fn init_logging(debug: bool) {
	use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

	let default_filter = if debug {
		"simple_storage=debug,warn"
	} else {
		"simple_storage=info,warn"
	};
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	let _ = tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_target(true)
				.with_thread_ids(false)
				.with_file(false)
				.with_line_number(false)
				.with_writer(std::io::stderr)
				.compact(),
		)
		.with(env_filter)
		.try_init();
}

/// Record the start of an operation
pub fn operation_start(operation: &str, context: &str) {
	info!(operation = operation, context = context, "Operation started");
}

/// Operation finished: tell the user and log it
pub fn operation_success(operation: &str, details: &str) {
	Display::success(&format!("{} completed successfully", operation));
	info!(operation = operation, details = details, "Operation completed successfully");
}

/// Operation failed: show the error and log it with its cause chain
///
/// # Arguments
/// * `operation` - Name of the failed command
/// * `error` - Error whose full chain is printed
pub fn operation_error(operation: &str, error: &anyhow::Error) {
	Display::error(&format!("{} failed: {:#}", operation, error));
	error!(operation = operation, error = %error, "Operation failed");
}

/// Record completion with timing information
pub fn operation_complete(operation: &str, duration_ms: u64) {
	info!(operation = operation, duration_ms = duration_ms, "Operation completed");
}
