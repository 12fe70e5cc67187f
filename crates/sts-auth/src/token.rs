//! SAML tokens and the validator collaborator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sts_crypto::Certificate;
use thiserror::Error;

use crate::principal::PrincipalId;

/// A SAML assertion as received, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlToken {
    xml: String,
}

impl SamlToken {
    /// Wraps the serialized assertion.
    pub fn new(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    /// The serialized assertion.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.xml
    }
}

/// Subject confirmation of a validated token.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// No proof of possession.
    Bearer,
    /// The presenter must prove possession of this certificate's key.
    HolderOfKey(Certificate),
}

/// A token that passed structural, temporal and signature checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedToken {
    /// Subject of the assertion.
    pub subject: PrincipalId,
    /// Delegates, oldest first.
    pub delegation_chain: Vec<PrincipalId>,
    /// Subject confirmation.
    pub confirmation: Confirmation,
    /// Issued by an external identity provider.
    pub external: bool,
    /// Authentication instant stated by the assertion.
    pub authn_instant: DateTime<Utc>,
}

impl ValidatedToken {
    /// The principal the token speaks for: the last delegate, or the subject.
    #[must_use]
    pub fn effective_principal(&self) -> &PrincipalId {
        self.delegation_chain.last().unwrap_or(&self.subject)
    }
}

/// Token validation failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token signature is invalid.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),
    /// The token is malformed, expired or otherwise unacceptable.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Validates SAML assertions.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validates `token`.
    async fn validate(&self, token: &SamlToken) -> Result<ValidatedToken, TokenError>;
}
