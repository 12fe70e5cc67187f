//! Configuration management commands.

use std::path::Path;

use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, output_single, success};
use crate::{CliConfig, CliResult};

/// Runs a config command.
///
/// `path` overrides the default configuration file.
pub fn run_config(
    cmd: ConfigCommand,
    config: &mut CliConfig,
    path: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config, path, format),
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config.save(path)?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", resolve(path)?);
            Ok(())
        }
    }
}

fn show_config(config: &CliConfig, path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
    if matches!(format, OutputFormat::Table) {
        info(&format!("Configuration file: {}", resolve(path)?));
        println!();
        println!("output_format: {:?}", config.output_format);
    }
    output_single(&config.sts, format)
}

fn resolve(path: Option<&Path>) -> CliResult<String> {
    Ok(match path {
        Some(path) => path.display().to_string(),
        None => CliConfig::config_path()?.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_persists_to_the_given_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sts.toml");
        let mut config = CliConfig::default();

        run_config(
            ConfigCommand::Set {
                key: "clock_tolerance_ms".to_string(),
                value: "30000".to_string(),
            },
            &mut config,
            Some(&path),
            OutputFormat::Quiet,
        )
        .unwrap();

        let loaded = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.sts.clock_tolerance_ms, 30_000);
    }

    #[test]
    fn rejected_value_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sts.toml");
        let mut config = CliConfig::default();

        let result = run_config(
            ConfigCommand::Set {
                key: "negotiation_sessions".to_string(),
                value: "0".to_string(),
            },
            &mut config,
            Some(&path),
            OutputFormat::Quiet,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
