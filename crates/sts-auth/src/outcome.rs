//! Authentication outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::principal::PrincipalId;

/// How a principal was authenticated.
///
/// The declaration order breaks ties between completed outcomes that share
/// an authentication instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthnMethod {
    /// Username and password.
    Password,
    /// Kerberos through a GSS negotiation.
    Kerberos,
    /// X.509 signature of a solution user.
    DigSig,
    /// A SAML assertion issued by this service.
    Assertion,
    /// A SAML assertion issued by an external identity provider.
    ExternalAssertion,
    /// A raw client certificate.
    Smartcard,
    /// A SecurID time-synchronized token.
    #[serde(rename = "TIMESYNCTOKEN")]
    TimeSyncToken,
}

impl AuthnMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "PASSWORD",
            Self::Kerberos => "KERBEROS",
            Self::DigSig => "DIG_SIG",
            Self::Assertion => "ASSERTION",
            Self::ExternalAssertion => "EXTERNAL_ASSERTION",
            Self::Smartcard => "SMARTCARD",
            Self::TimeSyncToken => "TIMESYNCTOKEN",
        }
    }
}

impl fmt::Display for AuthnMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finished authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedAuth {
    principal: PrincipalId,
    instant: DateTime<Utc>,
    method: AuthnMethod,
}

impl CompletedAuth {
    /// Creates a completed authentication.
    #[must_use]
    pub const fn new(principal: PrincipalId, instant: DateTime<Utc>, method: AuthnMethod) -> Self {
        Self {
            principal,
            instant,
            method,
        }
    }

    /// The authenticated principal.
    #[must_use]
    pub const fn principal(&self) -> &PrincipalId {
        &self.principal
    }

    /// When authentication happened.
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// How authentication happened.
    #[must_use]
    pub const fn method(&self) -> AuthnMethod {
        self.method
    }
}

/// A negotiation that needs another round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuth {
    method: AuthnMethod,
    server_leg: Vec<u8>,
    session_id: Option<String>,
}

impl PendingAuth {
    /// A GSS negotiation step; the caller's context identifies the session.
    #[must_use]
    pub const fn gss(server_leg: Vec<u8>) -> Self {
        Self {
            method: AuthnMethod::Kerberos,
            server_leg,
            session_id: None,
        }
    }

    /// A SecurID challenge; `prompt` is returned to the caller.
    pub fn passcode(session_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            method: AuthnMethod::TimeSyncToken,
            server_leg: prompt.into().into_bytes(),
            session_id: Some(session_id.into()),
        }
    }

    /// The scheme being negotiated.
    #[must_use]
    pub const fn method(&self) -> AuthnMethod {
        self.method
    }

    /// Bytes to hand back to the caller.
    #[must_use]
    pub fn server_leg(&self) -> &[u8] {
        &self.server_leg
    }

    /// Session the next round belongs to, when the scheme issues one.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Outcome of an authenticator that found its credential.
///
/// Absence of the credential is `None` at the call site, not a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Authentication finished.
    Completed(CompletedAuth),
    /// Negotiation continues.
    Incomplete(PendingAuth),
}

impl AuthOutcome {
    /// Shorthand for a completed outcome.
    #[must_use]
    pub const fn completed(principal: PrincipalId, instant: DateTime<Utc>, method: AuthnMethod) -> Self {
        Self::Completed(CompletedAuth::new(principal, instant, method))
    }

    /// Returns the completed authentication, if any.
    #[must_use]
    pub const fn as_completed(&self) -> Option<&CompletedAuth> {
        match self {
            Self::Completed(completed) => Some(completed),
            Self::Incomplete(_) => None,
        }
    }

    /// Returns true when authentication finished.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The method of either shape.
    #[must_use]
    pub const fn method(&self) -> AuthnMethod {
        match self {
            Self::Completed(completed) => completed.method,
            Self::Incomplete(pending) => pending.method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn completed_equality_uses_all_fields() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let user = PrincipalId::new("user", "acme.com");
        let a = CompletedAuth::new(user.clone(), at, AuthnMethod::Password);
        assert_eq!(a, CompletedAuth::new(user.clone(), at, AuthnMethod::Password));
        assert_ne!(a, CompletedAuth::new(user.clone(), at, AuthnMethod::Kerberos));
        assert_ne!(
            a,
            CompletedAuth::new(user, at + chrono::Duration::seconds(1), AuthnMethod::Password)
        );
    }

    #[test]
    fn method_names() {
        assert_eq!(AuthnMethod::DigSig.to_string(), "DIG_SIG");
        assert_eq!(
            serde_json::to_string(&AuthnMethod::ExternalAssertion).unwrap(),
            "\"EXTERNAL_ASSERTION\""
        );
        assert_eq!(
            serde_json::to_string(&AuthnMethod::TimeSyncToken).unwrap(),
            "\"TIMESYNCTOKEN\""
        );
    }

    #[test]
    fn pending_shapes() {
        let gss = AuthOutcome::Incomplete(PendingAuth::gss(vec![1, 2]));
        assert!(!gss.is_completed());
        assert_eq!(gss.method(), AuthnMethod::Kerberos);

        let passcode = PendingAuth::passcode("session-1", "Enter next code");
        assert_eq!(passcode.session_id(), Some("session-1"));
        assert_eq!(passcode.server_leg(), b"Enter next code");
    }
}
