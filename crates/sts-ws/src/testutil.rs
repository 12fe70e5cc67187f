//! Test collaborators.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use sts_auth::{
    AuthError, AuthOutcome, AuthResult, Authenticator, Confirmation, GssOutcome, PasscodeOutcome,
    PrincipalDiscovery, PrincipalError, PrincipalId, Request, SamlToken, SolutionUser, TokenError,
    TokenValidator, ValidatedToken,
};
use sts_crypto::Certificate;

use crate::authority::{AuthorityError, TokenAuthority, TokenSpec};

/// Authenticator answering from a queue, one answer per call.
#[derive(Default)]
pub struct ScriptedAuthenticator {
    answers: Mutex<VecDeque<AuthResult<Option<AuthOutcome>>>>,
    calls: Mutex<usize>,
}

impl ScriptedAuthenticator {
    pub fn push(&self, answer: AuthResult<Option<AuthOutcome>>) {
        self.answers.lock().push_back(answer);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Authenticator for ScriptedAuthenticator {
    fn id(&self) -> &'static str {
        "scripted"
    }

    async fn authenticate(&self, _request: &Request) -> AuthResult<Option<AuthOutcome>> {
        *self.calls.lock() += 1;
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::request_failed("no scripted answer left")))
    }
}

/// Directory that only answers group membership.
#[derive(Default)]
pub struct StubDiscovery {
    members: Vec<PrincipalId>,
    vanished: bool,
}

impl StubDiscovery {
    pub fn with_member(principal: PrincipalId) -> Self {
        Self {
            members: vec![principal],
            vanished: false,
        }
    }

    pub fn vanished() -> Self {
        Self {
            members: Vec::new(),
            vanished: true,
        }
    }
}

#[async_trait]
impl PrincipalDiscovery for StubDiscovery {
    async fn find_solution_user_by_subject_dn(
        &self,
        _subject_dn: &str,
    ) -> Result<Option<SolutionUser>, PrincipalError> {
        Ok(None)
    }

    async fn find_principal_by_certificate_chain(
        &self,
        _chain: &[Certificate],
    ) -> Result<PrincipalId, PrincipalError> {
        Err(PrincipalError::InvalidPrincipal)
    }

    async fn authenticate_username_password(
        &self,
        _upn: &str,
        _password: &str,
    ) -> Result<PrincipalId, PrincipalError> {
        Err(PrincipalError::InvalidCredentials)
    }

    async fn authenticate_passcode(
        &self,
        _upn: &str,
        _session_id: &str,
        _passcode: &str,
    ) -> Result<PasscodeOutcome, PrincipalError> {
        Err(PrincipalError::InvalidCredentials)
    }

    async fn authenticate_gss(
        &self,
        _context_id: &str,
        _leg: &[u8],
    ) -> Result<GssOutcome, PrincipalError> {
        Err(PrincipalError::InvalidCredentials)
    }

    async fn is_member_of_system_group(
        &self,
        principal: &PrincipalId,
        _group: &str,
    ) -> Result<bool, PrincipalError> {
        if self.vanished {
            return Err(PrincipalError::InvalidPrincipal);
        }
        Ok(self.members.contains(principal))
    }
}

/// Token validator with a fixed verdict.
pub enum StubValidator {
    Valid,
    Expired,
    BadSignature,
}

#[async_trait]
impl TokenValidator for StubValidator {
    async fn validate(&self, _token: &SamlToken) -> Result<ValidatedToken, TokenError> {
        match self {
            Self::Valid => Ok(ValidatedToken {
                subject: PrincipalId::new("alice", "acme.com"),
                delegation_chain: Vec::new(),
                confirmation: Confirmation::Bearer,
                external: false,
                authn_instant: Utc::now(),
            }),
            Self::Expired => Err(TokenError::InvalidToken("token expired".to_string())),
            Self::BadSignature => Err(TokenError::InvalidSignature("digest mismatch".to_string())),
        }
    }
}

/// Authority recording every spec it is asked to issue.
#[derive(Default)]
pub struct StubAuthority {
    specs: Mutex<Vec<TokenSpec>>,
    failure: Mutex<Option<fn() -> AuthorityError>>,
}

impl StubAuthority {
    pub fn specs(&self) -> Vec<TokenSpec> {
        self.specs.lock().clone()
    }

    pub fn reject_lifetime(&self) {
        *self.failure.lock() =
            Some(|| AuthorityError::UnsupportedTokenLifetime("too long".to_string()));
    }

    pub fn reject_renewal(&self) {
        *self.failure.lock() = Some(|| AuthorityError::Renew("token revoked".to_string()));
    }
}

#[async_trait]
impl TokenAuthority for StubAuthority {
    async fn issue(&self, spec: &TokenSpec) -> Result<SamlToken, AuthorityError> {
        if let Some(fail) = *self.failure.lock() {
            return Err(fail());
        }
        self.specs.lock().push(spec.clone());
        Ok(SamlToken::new(format!(
            "<saml2:Assertion Subject=\"{}\"/>",
            spec.principal
        )))
    }
}
