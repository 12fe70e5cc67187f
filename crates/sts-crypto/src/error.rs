//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by certificate parsing and signature verification.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The certificate encoding is malformed.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// The algorithm or key combination is not supported.
    #[error("algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature did not verify.
    #[error("signature verification failed")]
    Verification,

    /// Base64 decoding failed.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}
