//! Kerberos over SPNEGO, carried in `wst:BinaryExchange` legs.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use sts_xmldsig::types::token::BASE64_ENCODING;
use tracing::{debug, warn};

use crate::authenticator::Authenticator;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{AuthOutcome, AuthnMethod, PendingAuth};
use crate::principal::{GssOutcome, PrincipalDiscovery};
use crate::request::Request;

/// Value type of a SPNEGO binary exchange.
pub const SPNEGO_VALUE_TYPE: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust/spnego";

/// Runs one GSS negotiation step per request.
pub struct GssAuthenticator {
    discovery: Arc<dyn PrincipalDiscovery>,
}

impl GssAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub fn new(discovery: Arc<dyn PrincipalDiscovery>) -> Self {
        Self { discovery }
    }
}

#[async_trait]
impl Authenticator for GssAuthenticator {
    fn id(&self) -> &'static str {
        "gss-negotiation"
    }

    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>> {
        let Some(exchange) = &request.rst.binary_exchange else {
            return Ok(None);
        };

        if exchange.value_type != SPNEGO_VALUE_TYPE {
            return Err(AuthError::unsupported_token(format!(
                "Unsupported binary exchange value type: {}",
                exchange.value_type
            )));
        }
        if exchange.encoding_type != BASE64_ENCODING {
            return Err(AuthError::unsupported_token(format!(
                "Unsupported binary exchange encoding type: {}",
                exchange.encoding_type
            )));
        }

        let context = request
            .rst
            .context
            .as_deref()
            .ok_or_else(|| AuthError::request_failed("Bad request! Missing context value!"))?;

        let compact: String = exchange.value.split_whitespace().collect();
        let leg = STANDARD.decode(compact).map_err(|err| {
            AuthError::unsupported_token("Binary exchange is not valid base64").with_source(err)
        })?;

        let outcome = self
            .discovery
            .authenticate_gss(context, &leg)
            .await
            .inspect_err(|err| warn!(%context, error = %err, "GSS negotiation failed"))?;

        match outcome {
            GssOutcome::Completed(principal) => {
                debug!(%principal, %context, "GSS negotiation completed");
                Ok(Some(AuthOutcome::completed(
                    principal,
                    Utc::now(),
                    AuthnMethod::Kerberos,
                )))
            }
            GssOutcome::Continue(server_leg) => {
                debug!(%context, "GSS negotiation continues");
                Ok(Some(AuthOutcome::Incomplete(PendingAuth::gss(server_leg))))
            }
        }
    }
}
