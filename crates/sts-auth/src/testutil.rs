//! Test collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc};
use parking_lot::Mutex;
use sts_crypto::Certificate;

use crate::principal::{
    GssOutcome, PasscodeOutcome, PrincipalDiscovery, PrincipalError, PrincipalId, SolutionUser,
};
use crate::token::{SamlToken, TokenError, TokenValidator, ValidatedToken};

/// A self-signed certificate valid around now, and its private key.
pub fn certificate(name: &str) -> (Certificate, Vec<u8>) {
    certificate_valid(name, -1, 1)
}

/// A self-signed certificate valid from `from_days` to `to_days` relative to now.
pub fn certificate_valid(name: &str, from_days: i64, to_days: i64) -> (Certificate, Vec<u8>) {
    let mut params = rcgen::CertificateParams::new(vec![format!("{name}.example.com")]);
    let mut dn = rcgen::DistinguishedName::new();
    dn.push(rcgen::DnType::CommonName, name);
    params.distinguished_name = dn;
    let start = Utc::now() + Duration::days(from_days);
    let end = Utc::now() + Duration::days(to_days);
    let (month, day) = month_day(start);
    params.not_before = rcgen::date_time_ymd(start.year(), month, day);
    let (month, day) = month_day(end);
    params.not_after = rcgen::date_time_ymd(end.year(), month, day);
    let generated = rcgen::Certificate::from_params(params).unwrap();
    let cert = Certificate::from_der(generated.serialize_der().unwrap()).unwrap();
    (cert, generated.serialize_private_key_der())
}

fn month_day(at: DateTime<Utc>) -> (u8, u8) {
    (
        u8::try_from(at.month()).unwrap(),
        u8::try_from(at.day()).unwrap(),
    )
}

/// Principal discovery backed by in-memory tables.
#[derive(Default)]
pub struct MockDiscovery {
    pub passwords: HashMap<(String, String), Result<PrincipalId, fn() -> PrincipalError>>,
    pub passcodes: HashMap<String, Result<PasscodeOutcome, fn() -> PrincipalError>>,
    pub solution_users: HashMap<String, SolutionUser>,
    pub certificate_principals: Vec<(Vec<u8>, PrincipalId)>,
    pub gss_steps: Mutex<HashMap<String, Vec<GssOutcome>>>,
    pub groups: HashMap<String, Vec<PrincipalId>>,
    pub system_failure: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockDiscovery {
    pub fn with_password(mut self, upn: &str, password: &str, principal: PrincipalId) -> Self {
        self.passwords
            .insert((upn.to_string(), password.to_string()), Ok(principal));
        self
    }

    pub fn with_password_error(mut self, upn: &str, password: &str, err: fn() -> PrincipalError) -> Self {
        self.passwords
            .insert((upn.to_string(), password.to_string()), Err(err));
        self
    }

    pub fn with_passcode(mut self, passcode: &str, outcome: PasscodeOutcome) -> Self {
        self.passcodes.insert(passcode.to_string(), Ok(outcome));
        self
    }

    pub fn with_passcode_error(mut self, passcode: &str, err: fn() -> PrincipalError) -> Self {
        self.passcodes.insert(passcode.to_string(), Err(err));
        self
    }

    pub fn with_solution_user(mut self, user: SolutionUser) -> Self {
        self.solution_users
            .insert(user.certificate.subject_dn().to_string(), user);
        self
    }

    pub fn with_certificate_principal(mut self, cert: &Certificate, principal: PrincipalId) -> Self {
        self.certificate_principals.push((cert.der().to_vec(), principal));
        self
    }

    /// Queues GSS steps for a context, consumed one per call.
    pub fn with_gss_steps(self, context: &str, steps: Vec<GssOutcome>) -> Self {
        self.gss_steps.lock().insert(context.to_string(), steps);
        self
    }

    pub fn with_group_member(mut self, group: &str, principal: PrincipalId) -> Self {
        self.groups.entry(group.to_string()).or_default().push(principal);
        self
    }

    pub fn failing(mut self) -> Self {
        self.system_failure = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> Result<(), PrincipalError> {
        self.calls.lock().push(call);
        if self.system_failure {
            Err(PrincipalError::System("directory unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PrincipalDiscovery for MockDiscovery {
    async fn find_solution_user_by_subject_dn(
        &self,
        subject_dn: &str,
    ) -> Result<Option<SolutionUser>, PrincipalError> {
        self.record(format!("solution_user:{subject_dn}"))?;
        Ok(self.solution_users.get(subject_dn).cloned())
    }

    async fn find_principal_by_certificate_chain(
        &self,
        chain: &[Certificate],
    ) -> Result<PrincipalId, PrincipalError> {
        self.record("certificate_chain".to_string())?;
        let leaf = chain.first().ok_or(PrincipalError::InvalidPrincipal)?;
        self.certificate_principals
            .iter()
            .find(|(der, _)| der.as_slice() == leaf.der())
            .map(|(_, principal)| principal.clone())
            .ok_or(PrincipalError::InvalidPrincipal)
    }

    async fn authenticate_username_password(
        &self,
        upn: &str,
        password: &str,
    ) -> Result<PrincipalId, PrincipalError> {
        self.record(format!("password:{upn}"))?;
        match self.passwords.get(&(upn.to_string(), password.to_string())) {
            Some(Ok(principal)) => Ok(principal.clone()),
            Some(Err(make)) => Err(make()),
            None => Err(PrincipalError::InvalidCredentials),
        }
    }

    async fn authenticate_passcode(
        &self,
        upn: &str,
        session_id: &str,
        passcode: &str,
    ) -> Result<PasscodeOutcome, PrincipalError> {
        self.record(format!("passcode:{upn}:{session_id}"))?;
        match self.passcodes.get(passcode) {
            Some(Ok(outcome)) => Ok(outcome.clone()),
            Some(Err(make)) => Err(make()),
            None => Err(PrincipalError::InvalidCredentials),
        }
    }

    async fn authenticate_gss(
        &self,
        context_id: &str,
        leg: &[u8],
    ) -> Result<GssOutcome, PrincipalError> {
        self.record(format!("gss:{context_id}:{}", leg.len()))?;
        let mut steps = self.gss_steps.lock();
        let queue = steps
            .get_mut(context_id)
            .filter(|queue| !queue.is_empty())
            .ok_or(PrincipalError::InvalidCredentials)?;
        Ok(queue.remove(0))
    }

    async fn is_member_of_system_group(
        &self,
        principal: &PrincipalId,
        group: &str,
    ) -> Result<bool, PrincipalError> {
        self.record(format!("group:{group}"))?;
        Ok(self
            .groups
            .get(group)
            .is_some_and(|members| members.contains(principal)))
    }
}

/// Canned answers of [`MockTokenValidator`].
#[derive(Clone)]
pub enum MockAnswer {
    Token(ValidatedToken),
    BadSignature,
    BadToken,
}

/// Token validator returning a fixed answer.
pub struct MockTokenValidator {
    pub answer: MockAnswer,
}

impl MockTokenValidator {
    pub fn returning(token: ValidatedToken) -> Self {
        Self {
            answer: MockAnswer::Token(token),
        }
    }

    pub fn failing(answer: MockAnswer) -> Self {
        Self { answer }
    }
}

#[async_trait]
impl TokenValidator for MockTokenValidator {
    async fn validate(&self, _token: &SamlToken) -> Result<ValidatedToken, TokenError> {
        match &self.answer {
            MockAnswer::Token(token) => Ok(token.clone()),
            MockAnswer::BadSignature => Err(TokenError::InvalidSignature(
                "assertion signature mismatch".to_string(),
            )),
            MockAnswer::BadToken => Err(TokenError::InvalidToken("assertion expired".to_string())),
        }
    }
}
