//! CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sts_core::StsConfig;

use crate::{CliError, CliResult};

/// CLI configuration, stored as TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Output format.
    pub output_format: OutputFormat,

    /// Settings shared with the service.
    pub sts: StsConfig,
}

impl CliConfig {
    /// Loads configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration.
    pub fn from_toml_str(content: &str) -> CliResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CliError::Config(format!("failed to parse config: {e}")))?;
        config.sts.validate()?;
        Ok(config)
    }

    /// Saves configuration to `path`, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> CliResult<()> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Gets the default configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".sts").join("sts.toml"))
    }

    /// Sets one value by key.
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        match key {
            "output_format" | "output" => {
                self.output_format = match value.to_lowercase().as_str() {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    "quiet" => OutputFormat::Quiet,
                    _ => {
                        return Err(CliError::InvalidArgument(format!(
                            "Unknown output format: {value}. Supported: table, json, quiet"
                        )));
                    }
                };
            }
            "clock_tolerance_ms" => self.sts.clock_tolerance_ms = parse(key, value)?,
            "allow_sha1" => self.sts.allow_sha1 = parse(key, value)?,
            "negotiation_sessions" => self.sts.negotiation_sessions = parse(key, value)?,
            "act_as_group" => self.sts.act_as_group = value.to_string(),
            _ => {
                return Err(CliError::InvalidArgument(format!(
                    "Unknown configuration key: {key}. Known keys: output_format, \
                     clock_tolerance_ms, allow_sha1, negotiation_sessions, act_as_group"
                )));
            }
        }
        self.sts.validate()?;
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> CliResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("{key} has an invalid value: {value}")))
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (exit status only).
    Quiet,
}
