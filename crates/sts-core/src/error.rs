//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading shared configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value is missing or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// TOML could not be parsed.
    #[error("configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
