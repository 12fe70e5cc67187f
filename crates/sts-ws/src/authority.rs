//! The token authority that signs issued assertions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sts_auth::{AuthnMethod, Lifetime, PrincipalId, SamlToken};
use thiserror::Error;

use crate::error::StsError;

/// What the authority is asked to issue.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpec {
    /// Authenticated principal.
    pub principal: PrincipalId,
    /// How the principal was authenticated.
    pub authn_method: AuthnMethod,
    /// When the principal was authenticated.
    pub authn_instant: DateTime<Utc>,
    /// Requested token lifetime.
    pub lifetime: Option<Lifetime>,
    /// Delegate named by `wst:DelegateTo`.
    pub delegate_to: Option<String>,
    /// Whether the token may be delegated further.
    pub delegatable: bool,
    /// Assertion presented in `wst:ActAs`.
    pub act_as: Option<SamlToken>,
    /// Token being renewed.
    pub renew_of: Option<SamlToken>,
}

/// Failures reported by the token authority.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The requested lifetime is outside what the authority accepts.
    #[error("unsupported token lifetime: {0}")]
    UnsupportedTokenLifetime(String),
    /// Delegation is not permitted.
    #[error("delegation rejected: {0}")]
    Delegation(String),
    /// The token cannot be renewed.
    #[error("renewal rejected: {0}")]
    Renew(String),
}

impl From<AuthorityError> for StsError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::UnsupportedTokenLifetime(_) => {
                Self::invalid_time_range("The token authority rejected the requested lifetime")
                    .with_source(err)
            }
            AuthorityError::Delegation(_) => Self::invalid_request("Delegation failed").with_source(err),
            AuthorityError::Renew(_) => Self::unable_to_renew("Token renewal failed").with_source(err),
        }
    }
}

/// Issues signed assertions.
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Issues a token for the spec.
    async fn issue(&self, spec: &TokenSpec) -> Result<SamlToken, AuthorityError>;
}
