//! Authentication error types.

use sts_core::BoxError;
use thiserror::Error;

use crate::principal::PrincipalError;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised by scheme authenticators.
///
/// Each variant carries a public message and an optional cause.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials were presented but are not acceptable.
    #[error("{message}")]
    InvalidCredentials {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// The credential is malformed or of an unknown type.
    #[error("{message}")]
    UnsupportedSecurityToken {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// A presented token failed signature validation.
    #[error("{message}")]
    InvalidSignature {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// A backend collaborator failed.
    #[error("{message}")]
    RequestFailed {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },
}

impl AuthError {
    /// Creates an `InvalidCredentials` error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an `UnsupportedSecurityToken` error.
    pub fn unsupported_token(message: impl Into<String>) -> Self {
        Self::UnsupportedSecurityToken {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an `InvalidSignature` error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a `RequestFailed` error.
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a cause.
    #[must_use]
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        let slot = match &mut self {
            Self::InvalidCredentials { source, .. }
            | Self::UnsupportedSecurityToken { source, .. }
            | Self::InvalidSignature { source, .. }
            | Self::RequestFailed { source, .. } => source,
        };
        *slot = Some(cause.into());
        self
    }

    /// The public message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidCredentials { message, .. }
            | Self::UnsupportedSecurityToken { message, .. }
            | Self::InvalidSignature { message, .. }
            | Self::RequestFailed { message, .. } => message,
        }
    }

    /// Returns true for `InvalidCredentials`.
    #[must_use]
    pub const fn is_invalid_credentials(&self) -> bool {
        matches!(self, Self::InvalidCredentials { .. })
    }

    /// Returns true for `UnsupportedSecurityToken`.
    #[must_use]
    pub const fn is_unsupported_token(&self) -> bool {
        matches!(self, Self::UnsupportedSecurityToken { .. })
    }

    /// Returns true for `RequestFailed`.
    #[must_use]
    pub const fn is_request_failed(&self) -> bool {
        matches!(self, Self::RequestFailed { .. })
    }
}

impl From<PrincipalError> for AuthError {
    fn from(err: PrincipalError) -> Self {
        if matches!(err, PrincipalError::System(_)) {
            Self::request_failed("Authentication backend failure").with_source(err)
        } else {
            Self::invalid_credentials("Invalid credentials").with_source(err)
        }
    }
}
