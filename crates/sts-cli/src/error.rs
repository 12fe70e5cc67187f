//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid STS settings.
    #[error(transparent)]
    Core(#[from] sts_core::CoreError),

    /// XML could not be parsed or canonicalized.
    #[error(transparent)]
    Xml(#[from] sts_xmldsig::XmlError),

    /// The request signature was rejected with the given fault code.
    #[error("signature rejected: {0}")]
    Rejected(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
