//! SAML assertions presented in the security header.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::authenticator::Authenticator;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{AuthOutcome, AuthnMethod};
use crate::request::Request;
use crate::token::{Confirmation, TokenError, TokenValidator};

/// Authenticates bearer and holder-of-key assertions.
pub struct SamlAuthenticator {
    validator: Arc<dyn TokenValidator>,
}

impl SamlAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl Authenticator for SamlAuthenticator {
    fn id(&self) -> &'static str {
        "saml-token"
    }

    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>> {
        let Some(token) = &request.saml_token else {
            return Ok(None);
        };

        let validated = self.validator.validate(token).await.map_err(|err| {
            warn!(error = %err, "presented assertion rejected");
            match err {
                TokenError::InvalidSignature(_) => {
                    AuthError::invalid_signature("Token signature is invalid").with_source(err)
                }
                TokenError::InvalidToken(_) => {
                    AuthError::invalid_credentials("Token is invalid").with_source(err)
                }
            }
        })?;

        if let Confirmation::HolderOfKey(confirmation) = &validated.confirmation {
            let signer = request.signature.as_ref().ok_or_else(|| {
                AuthError::invalid_credentials("Holder-of-key token requires a signed request")
            })?;
            // Compared on encoded bytes; equal subjects are not enough.
            if signer.certificate().der() != confirmation.der() {
                warn!(subject = %validated.subject, "request signer is not the token's confirmation key");
                return Err(AuthError::invalid_credentials(
                    "Request signing certificate does not match the token confirmation certificate",
                ));
            }
        }

        let method = if validated.external {
            AuthnMethod::ExternalAssertion
        } else {
            AuthnMethod::Assertion
        };
        let principal = validated.effective_principal().clone();
        debug!(%principal, %method, "assertion accepted");
        Ok(Some(AuthOutcome::completed(
            principal,
            validated.authn_instant,
            method,
        )))
    }
}
