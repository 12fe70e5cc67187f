//! Username token: password, or SecurID passcode.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::authenticator::Authenticator;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{AuthOutcome, AuthnMethod, PendingAuth};
use crate::principal::{PasscodeOutcome, PrincipalDiscovery};
use crate::request::{Request, TokenValue};

/// Authenticates `wsse:UsernameToken` credentials.
pub struct UntAuthenticator {
    discovery: Arc<dyn PrincipalDiscovery>,
}

impl UntAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub fn new(discovery: Arc<dyn PrincipalDiscovery>) -> Self {
        Self { discovery }
    }
}

#[async_trait]
impl Authenticator for UntAuthenticator {
    fn id(&self) -> &'static str {
        "username-token"
    }

    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>> {
        let Some(token) = &request.header.username_token else {
            return Ok(None);
        };

        let username = token
            .username
            .as_ref()
            .and_then(|username| username.value.as_deref())
            .filter(|username| !username.is_empty())
            .ok_or_else(|| AuthError::unsupported_token("Username token without a user name"))?;

        match (&token.password, &token.passcode) {
            (Some(password), None) => {
                let password = required_value(password, "Password")?;
                let principal = self
                    .discovery
                    .authenticate_username_password(username, password)
                    .await
                    .inspect_err(|err| warn!(user = %username, error = %err, "password authentication failed"))?;
                debug!(%principal, "password authentication completed");
                Ok(Some(AuthOutcome::completed(principal, Utc::now(), AuthnMethod::Password)))
            }
            (None, Some(passcode)) => {
                let passcode = required_value(passcode, "Passcode")?;
                let session = request
                    .rst
                    .context
                    .as_deref()
                    .ok_or_else(|| AuthError::request_failed("Bad request! Missing context value!"))?;
                let outcome = self
                    .discovery
                    .authenticate_passcode(username, session, passcode)
                    .await
                    .inspect_err(|err| warn!(user = %username, error = %err, "passcode authentication failed"))?;
                match outcome {
                    PasscodeOutcome::Completed(principal) => {
                        debug!(%principal, "passcode authentication completed");
                        Ok(Some(AuthOutcome::completed(
                            principal,
                            Utc::now(),
                            AuthnMethod::TimeSyncToken,
                        )))
                    }
                    PasscodeOutcome::Challenge {
                        session_id,
                        message,
                    } => {
                        debug!(%session_id, "passcode authentication needs another round");
                        Ok(Some(AuthOutcome::Incomplete(PendingAuth::passcode(session_id, message))))
                    }
                }
            }
            (Some(_), Some(_)) => Err(AuthError::unsupported_token(
                "Username token carries both a password and a passcode",
            )),
            (None, None) => Err(AuthError::unsupported_token(
                "Username token carries neither a password nor a passcode",
            )),
        }
    }
}

fn required_value<'a>(value: &'a TokenValue, element: &str) -> AuthResult<&'a str> {
    value
        .value
        .as_deref()
        .ok_or_else(|| AuthError::unsupported_token(format!("{element} element has no value")))
}
