//! Operation error types.

use sts_auth::AuthError;
use sts_core::{BoxError, WsFault};
use thiserror::Error;

/// Result type for STS operations.
pub type StsResult<T> = Result<T, StsError>;

/// Errors raised by the STS operations.
///
/// The [`FaultMapper`](crate::FaultMapper) turns every variant into a wire
/// fault.
#[derive(Debug, Error)]
pub enum StsError {
    /// Authentication failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A fault raised with an explicit key, e.g. by the signature validator.
    #[error(transparent)]
    Fault(#[from] WsFault),

    /// The request is not acceptable for this operation.
    #[error("{message}")]
    InvalidRequest {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// The operation could not be completed.
    #[error("{message}")]
    RequestFailed {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// The request lifetime does not contain the current time.
    #[error("{0}")]
    RequestExpired(String),

    /// The security header is unusable.
    #[error("{message}")]
    InvalidSecurity {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// A required security header element is missing.
    #[error("{0}")]
    InvalidSecurityHeader(String),

    /// The token authority rejected the requested lifetime.
    #[error("{message}")]
    InvalidTimeRange {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// Renewal failed.
    #[error("{message}")]
    UnableToRenew {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// No identity provider is configured for the tenant.
    #[error("no such identity provider: {tenant}")]
    NoSuchIdp {
        /// Requested tenant.
        tenant: String,
    },

    /// A token presented for validation has an invalid signature.
    #[error("{message}")]
    InvalidSignature {
        /// Public message.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },
}

impl StsError {
    /// Creates an `InvalidRequest` error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
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

    /// Creates an `InvalidSecurity` error.
    pub fn invalid_security(message: impl Into<String>) -> Self {
        Self::InvalidSecurity {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an `InvalidTimeRange` error.
    pub fn invalid_time_range(message: impl Into<String>) -> Self {
        Self::InvalidTimeRange {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an `UnableToRenew` error.
    pub fn unable_to_renew(message: impl Into<String>) -> Self {
        Self::UnableToRenew {
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

    /// Attaches a cause. Variants without a cause slot are returned unchanged.
    #[must_use]
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::InvalidRequest { source, .. }
            | Self::RequestFailed { source, .. }
            | Self::InvalidSecurity { source, .. }
            | Self::InvalidTimeRange { source, .. }
            | Self::UnableToRenew { source, .. }
            | Self::InvalidSignature { source, .. } => *source = Some(cause.into()),
            Self::Auth(_)
            | Self::Fault(_)
            | Self::RequestExpired(_)
            | Self::InvalidSecurityHeader(_)
            | Self::NoSuchIdp { .. } => {}
        }
        self
    }
}
