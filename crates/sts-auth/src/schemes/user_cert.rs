//! Client certificate tokens (smartcard logon).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sts_crypto::{CryptoError, SignatureAlgorithm};
use tracing::{debug, warn};

use crate::authenticator::Authenticator;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{AuthOutcome, AuthnMethod};
use crate::principal::PrincipalDiscovery;
use crate::request::Request;

/// Authenticates a client certificate by the signature it carries over
/// its signed-info string.
///
/// SHA-1 signatures are refused unless enabled with [`Self::allow_sha1`],
/// the same policy the message signature validator applies.
pub struct UserCertAuthenticator {
    discovery: Arc<dyn PrincipalDiscovery>,
    allow_sha1: bool,
}

impl UserCertAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub fn new(discovery: Arc<dyn PrincipalDiscovery>) -> Self {
        Self {
            discovery,
            allow_sha1: false,
        }
    }

    /// Accepts or refuses RSA-SHA1 signatures.
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }
}

#[async_trait]
impl Authenticator for UserCertAuthenticator {
    fn id(&self) -> &'static str {
        "user-certificate"
    }

    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>> {
        let Some(token) = &request.header.user_certificate_token else {
            return Ok(None);
        };

        let uri = token
            .signature_algorithm
            .as_deref()
            .ok_or_else(|| AuthError::unsupported_token("Signature algorithm is missing"))?;
        if token.signature_value.is_empty() {
            return Err(AuthError::unsupported_token("Signature value is missing"));
        }
        let algorithm = SignatureAlgorithm::from_uri(uri).ok_or_else(|| {
            AuthError::unsupported_token(format!("Unsupported signature algorithm: {uri}"))
        })?;
        if algorithm.is_legacy() && !self.allow_sha1 {
            warn!(algorithm = uri, "SHA-1 user certificate signature refused");
            return Err(AuthError::unsupported_token(format!(
                "Signature algorithm not allowed: {uri}"
            )));
        }
        let leaf = token
            .certificates
            .first()
            .ok_or_else(|| AuthError::unsupported_token("Certificate chain is empty"))?;

        sts_crypto::verify(
            leaf,
            algorithm,
            token.signature_info.as_bytes(),
            &token.signature_value,
        )
        .map_err(|err| {
            warn!(subject = %leaf.subject_dn(), error = %err, "user certificate signature rejected");
            match err {
                CryptoError::UnsupportedAlgorithm(_) => {
                    AuthError::unsupported_token("Signature algorithm does not match the certificate key")
                        .with_source(err)
                }
                _ => AuthError::invalid_credentials("Signature validation failed").with_source(err),
            }
        })?;

        let principal = self
            .discovery
            .find_principal_by_certificate_chain(&token.certificates)
            .await
            .inspect_err(|err| warn!(subject = %leaf.subject_dn(), error = %err, "no principal for user certificate"))?;

        debug!(%principal, "user certificate authenticated");
        Ok(Some(AuthOutcome::completed(
            principal,
            Utc::now(),
            AuthnMethod::Smartcard,
        )))
    }
}
