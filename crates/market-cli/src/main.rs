//! Command-line front end for the gig marketplace.
//!
//! Loads the configuration, assembles a [`Marketplace`] and runs one
//! command against it. The session is kept by the configured storage
//! backend, so `login` in one invocation carries over to the next.

use clap::Parser;
use market_config::Config;
use market_core::{MarketBuilder, Marketplace};
use std::path::PathBuf;

mod commands;
mod render;

use commands::Command;
use render::Output;

/// Command-line arguments for the marketplace client.
#[derive(Parser, Debug)]
#[command(name = "gigmarket", author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "GIGMARKET_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	/// Print results as JSON instead of text
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(path = %args.config.display(), base_url = %config.client.base_url, "Loaded configuration");

	let market: Marketplace = MarketBuilder::new(config).build()?;
	let output = Output::new(args.json);

	if let Err(e) = commands::run(&market, args.command, &output).await {
		tracing::debug!(error = ?e, "Command failed");
		eprintln!("Error: {}", e);
		std::process::exit(1);
	}
	Ok(())
}
