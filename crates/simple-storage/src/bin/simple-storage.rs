//! Main binary entry point for the simple-storage CLI
//!
//! Parses arguments, sets up logging and runs the selected command. Any
//! failure is printed once with its cause chain and turns into a non-zero
//! exit status.

use anyhow::Result;
use clap::Parser;
use simple_storage::{
	cli::{output::Display, Cli, Commands},
	core::{
		config::CompilerConfig,
		logging::{init_logging, operation_complete, operation_error, operation_start, operation_success},
	},
	operations::{self, compile, PipelineOptions},
};
use std::process::ExitCode;
use std::time::Instant;
use tracing::instrument;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	// Load environment variables from .env file if it exists
	let _ = dotenvy::dotenv();

	let cli = Cli::parse();
	init_logging(cli.global.debug);

	let options = cli.pipeline_options();
	let (name, outcome) = match cli.command {
		Commands::Run { .. } => ("Run", handle_run(&options).await),
		Commands::Compile => ("Compile", handle_compile(&options).await),
	};

	match outcome {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			operation_error(name, &err);
			ExitCode::FAILURE
		},
	}
}

/// Handle the run command
#[instrument(skip_all)]
async fn handle_run(options: &PipelineOptions) -> Result<()> {
	operation_start("run", &options.source.display().to_string());
	let started = Instant::now();
	Display::header("SimpleStorage");

	let report = operations::run(options).await?;

	Display::header("Summary");
	Display::kv("chain", &report.chain.to_string());
	Display::kv("contract", &report.address.to_string());
	Display::kv("deploy tx", &report.deploy_tx.to_string());
	Display::kv("store tx", &report.store_tx.to_string());
	Display::kv("retrieve() before", &report.initial_value.to_string());
	Display::kv("retrieve() after", &report.final_value.to_string());

	if report.final_value == report.stored_value {
		operation_success("Run", &format!("{} deployed at {}", options.contract, report.address));
	} else {
		Display::warning(&format!(
			"Stored {} but retrieve() returned {}",
			report.stored_value, report.final_value
		));
	}

	operation_complete("run", started.elapsed().as_millis() as u64);
	Ok(())
}

/// Handle the compile command
#[instrument(skip_all)]
async fn handle_compile(options: &PipelineOptions) -> Result<()> {
	operation_start("compile", &options.source.display().to_string());
	let started = Instant::now();
	Display::header("Compiling");

	let compiler_config = CompilerConfig::from_env(&options.solc_version)?;
	let artifact = compile::compile(options, &compiler_config).await?;

	let functions: Vec<String> = artifact.abi.functions().map(|f| f.signature()).collect();
	Display::kv("functions", &functions.join(", "));
	Display::info(&format!("Full output written to {}", options.artifact.display()));
	operation_success("Compile", &artifact.name);

	operation_complete("compile", started.elapsed().as_millis() as u64);
	Ok(())
}
