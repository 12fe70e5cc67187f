//! Principals and the directory collaborator that resolves them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sts_crypto::Certificate;
use thiserror::Error;

/// A principal identifier: a name within a domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId {
    /// Account name.
    pub name: String,
    /// Domain the account belongs to.
    pub domain: String,
}

impl PrincipalId {
    /// Creates a principal identifier.
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.domain)
    }
}

/// A solution user, a service principal authenticated by certificate.
#[derive(Debug, Clone)]
pub struct SolutionUser {
    /// Principal identifier.
    pub principal: PrincipalId,
    /// Certificate registered for the solution user.
    pub certificate: Certificate,
    /// Whether the account is disabled.
    pub disabled: bool,
}

/// Failures reported by the directory.
#[derive(Debug, Error)]
pub enum PrincipalError {
    /// Wrong password, passcode or certificate.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The password has expired.
    #[error("password has expired")]
    PasswordExpired,
    /// The account is locked.
    #[error("account is locked")]
    LockedAccount,
    /// A SecurID token requires a new PIN.
    #[error("new PIN required")]
    NewPinRequired,
    /// The principal does not exist or cannot authenticate.
    #[error("invalid principal")]
    InvalidPrincipal,
    /// The directory could not be reached or failed.
    #[error("directory failure: {0}")]
    System(String),
}

/// Result of one GSS negotiation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GssOutcome {
    /// Negotiation finished.
    Completed(PrincipalId),
    /// Negotiation continues with this server leg.
    Continue(Vec<u8>),
}

/// Result of a SecurID passcode check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasscodeOutcome {
    /// The passcode was accepted.
    Completed(PrincipalId),
    /// The token server asks for another passcode.
    Challenge {
        /// Session to continue.
        session_id: String,
        /// Prompt for the user.
        message: String,
    },
}

/// Directory lookups and credential checks.
#[async_trait]
pub trait PrincipalDiscovery: Send + Sync {
    /// Finds a solution user by the subject DN of its certificate.
    async fn find_solution_user_by_subject_dn(
        &self,
        subject_dn: &str,
    ) -> Result<Option<SolutionUser>, PrincipalError>;

    /// Maps a client certificate chain to a principal.
    async fn find_principal_by_certificate_chain(
        &self,
        chain: &[Certificate],
    ) -> Result<PrincipalId, PrincipalError>;

    /// Checks a username and password.
    async fn authenticate_username_password(
        &self,
        upn: &str,
        password: &str,
    ) -> Result<PrincipalId, PrincipalError>;

    /// Checks a SecurID passcode within a session.
    async fn authenticate_passcode(
        &self,
        upn: &str,
        session_id: &str,
        passcode: &str,
    ) -> Result<PasscodeOutcome, PrincipalError>;

    /// Performs one GSS negotiation step for the given context.
    async fn authenticate_gss(
        &self,
        context_id: &str,
        leg: &[u8],
    ) -> Result<GssOutcome, PrincipalError>;

    /// Returns true if `principal` belongs to the named system group.
    async fn is_member_of_system_group(
        &self,
        principal: &PrincipalId,
        group: &str,
    ) -> Result<bool, PrincipalError>;
}
