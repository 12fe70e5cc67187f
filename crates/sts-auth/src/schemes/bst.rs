//! Solution users authenticated by the X.509 certificate that signed the request.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sts_xmldsig::CertificateLocation;
use tracing::{debug, warn};

use crate::authenticator::Authenticator;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{AuthOutcome, AuthnMethod};
use crate::principal::PrincipalDiscovery;
use crate::request::Request;

/// Authenticates requests signed with a binary security token.
pub struct BstAuthenticator {
    discovery: Arc<dyn PrincipalDiscovery>,
}

impl BstAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub fn new(discovery: Arc<dyn PrincipalDiscovery>) -> Self {
        Self { discovery }
    }
}

#[async_trait]
impl Authenticator for BstAuthenticator {
    fn id(&self) -> &'static str {
        "binary-security-token"
    }

    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>> {
        let Some(signature) = request
            .signature
            .as_ref()
            .filter(|signature| signature.location() == CertificateLocation::BinaryToken)
        else {
            debug!("no binary security token signature present");
            return Ok(None);
        };

        let certificate = signature.certificate();
        let subject = certificate.subject_dn();
        if subject.is_empty() {
            return Err(AuthError::invalid_credentials(
                "Signing certificate has no subject",
            ));
        }

        let Some(user) = self.discovery.find_solution_user_by_subject_dn(subject).await? else {
            debug!(%subject, "no solution user for signing certificate");
            return Ok(None);
        };

        if user.disabled {
            warn!(principal = %user.principal, "solution user is disabled");
            return Err(AuthError::invalid_credentials("Solution user is disabled"));
        }
        if !user.certificate.is_valid_at(Utc::now()) {
            warn!(principal = %user.principal, "solution user certificate is outside its validity period");
            return Err(AuthError::invalid_credentials(
                "Solution user certificate is not valid",
            ));
        }
        if user.certificate.der() != certificate.der() {
            warn!(principal = %user.principal, "signing certificate differs from the registered one");
            return Err(AuthError::invalid_credentials(
                "Signing certificate does not match the solution user certificate",
            ));
        }

        debug!(principal = %user.principal, "solution user authenticated");
        Ok(Some(AuthOutcome::completed(
            user.principal,
            Utc::now(),
            AuthnMethod::DigSig,
        )))
    }
}
