//! # STS CLI
//!
//! Command-line tools for the STS.

#![forbid(unsafe_code)]

use clap::Parser;
use sts_cli::{
    CliConfig,
    cli::{Cli, Command},
    commands::{run_canonicalize, run_config, run_faults, run_verify},
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();
    let mut config = CliConfig::load(config_path)
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    let format = cli.output.unwrap_or(config.output_format);

    let result = match cli.command {
        Command::Verify(args) => run_verify(args, &config, format).await,
        Command::Canonicalize(args) => run_canonicalize(args).await,
        Command::Faults => run_faults(format),
        Command::Config(cmd) => run_config(cmd, &mut config, config_path, format),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
