//! Operation responses.

use chrono::{DateTime, Utc};
use sts_auth::{AuthnMethod, PrincipalId, SamlToken};

/// A token issued or renewed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The signed assertion.
    pub token: SamlToken,
    /// Principal the token was issued to.
    pub principal: PrincipalId,
    /// How the principal authenticated.
    pub authn_method: AuthnMethod,
    /// When the principal authenticated.
    pub authn_instant: DateTime<Utc>,
}

/// Response of an issue or challenge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueResponse {
    /// Authentication finished and a token was issued.
    Issued(IssuedToken),
    /// A SPNEGO negotiation continues; send the leg back with the context.
    Negotiation {
        /// Negotiation context.
        context: String,
        /// Server leg.
        server_leg: Vec<u8>,
    },
    /// A SecurID server asks for another passcode.
    SecurIdChallenge {
        /// Session to answer in the next call's context.
        session_id: String,
        /// Prompt for the user.
        message: String,
    },
}

impl IssueResponse {
    /// Returns the issued token, if any.
    #[must_use]
    pub const fn issued(&self) -> Option<&IssuedToken> {
        match self {
            Self::Issued(token) => Some(token),
            Self::Negotiation { .. } | Self::SecurIdChallenge { .. } => None,
        }
    }
}
