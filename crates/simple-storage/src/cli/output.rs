//! Terminal output utilities and formatting
//!
//! Consistent coloured status lines for the pipeline steps.

use colored::Colorize;

/// Terminal display utilities for formatted CLI output
pub struct Display;

impl Display {
	/// Displays a formatted section header with underline
	///
	/// # Arguments
	/// * `text` - Header text; the underline matches its width
	pub fn header(text: &str) {
		println!("\n{}", text.bold().cyan());
		println!("{}", "─".repeat(text.chars().count()).cyan());
	}

	/// Displays a pipeline step with its position
	///
	/// # Arguments
	/// * `current` - One-based number of this step
	/// * `total` - Number of steps in the running command
	/// * `text` - What the step does
	pub fn step(current: usize, total: usize, text: &str) {
		println!("{} {}", format!("[{}/{}]", current, total).dimmed(), text);
	}

	/// Displays a success message with green checkmark
	pub fn success(message: &str) {
		println!("{} {}", "✓".green().bold(), message);
	}

	/// Displays an error message with red X symbol to stderr
	pub fn error(message: &str) {
		eprintln!("{} {}", "✗".red().bold(), message.red());
	}

	/// Displays a warning message with yellow warning symbol
	pub fn warning(message: &str) {
		println!("{} {}", "⚠".yellow().bold(), message.yellow());
	}

	/// Displays an informational message with blue info symbol
	pub fn info(message: &str) {
		println!("{} {}", "ℹ".blue().bold(), message);
	}

	/// Displays a key-value pair with formatted labels
	///
	/// # Arguments
	/// * `key` - Label shown in bold
	/// * `value` - Value shown after the label
	pub fn kv(key: &str, value: &str) {
		println!("  {} {}", format!("{}:", key).bold(), value);
	}
}
