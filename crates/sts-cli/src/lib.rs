//! # sts-cli
//!
//! Offline tools for the STS.
//!
//! This crate provides command-line utilities for:
//! - Validating the signature of a captured SOAP request
//! - Printing the exclusive canonical form of a document or element
//! - Listing the SOAP fault codes the service returns
//! - Managing the CLI configuration file

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
