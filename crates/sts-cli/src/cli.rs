//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// STS CLI - offline tools for WS-Trust requests and faults.
#[derive(Debug, Parser)]
#[command(name = "sts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.sts/sts.toml).
    #[arg(short, long, env = "STS_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate the signature of a SOAP request.
    Verify(VerifyArgs),

    /// Print the exclusive canonical form of a document or element.
    Canonicalize(CanonicalizeArgs),

    /// List the fault codes the service can return.
    Faults,

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments of `verify`.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// SOAP 1.1 envelope file.
    pub envelope: PathBuf,

    /// Accept SHA-1 digests and signatures (overrides config).
    #[arg(long)]
    pub allow_sha1: Option<bool>,
}

/// Arguments of `canonicalize`.
#[derive(Debug, Args)]
pub struct CanonicalizeArgs {
    /// XML file.
    pub file: PathBuf,

    /// Canonicalize the element with this ID instead of the document element.
    #[arg(long)]
    pub id: Option<String>,

    /// Inclusive namespace prefixes; `#default` names the default namespace.
    #[arg(long, value_delimiter = ',')]
    pub prefixes: Vec<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Print the configuration file path.
    Path,
}
