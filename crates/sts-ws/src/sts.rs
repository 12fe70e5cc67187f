//! WS-Trust operations: issue, renew, validate and challenge.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use sts_auth::{
    AuthError, AuthOutcome, Authenticator, AuthnMethod, CompletedAuth, PendingAuth,
    PrincipalDiscovery, PrincipalError, Request, TokenError, TokenValidator, request_type,
};
use sts_core::StsConfig;
use tracing::{debug, error, info, instrument};

use crate::authority::{TokenAuthority, TokenSpec};
use crate::error::{StsError, StsResult};
use crate::response::{IssueResponse, IssuedToken};
use crate::session::NegotiationSessions;

/// Collaborators of one tenant's STS.
pub struct StsServices {
    /// Authentication pipeline, usually a composite.
    pub authenticator: Arc<dyn Authenticator>,
    /// Validator for tokens presented to `validate`.
    pub token_validator: Arc<dyn TokenValidator>,
    /// Issuer of new tokens.
    pub authority: Arc<dyn TokenAuthority>,
    /// Directory, used for the act-as permission check.
    pub discovery: Arc<dyn PrincipalDiscovery>,
}

/// The Security Token Service of one tenant.
pub struct Sts {
    config: StsConfig,
    services: StsServices,
    spnego_sessions: NegotiationSessions,
    securid_sessions: NegotiationSessions,
}

impl Sts {
    /// Creates the service.
    #[must_use]
    pub fn new(config: StsConfig, services: StsServices) -> Self {
        Self {
            spnego_sessions: NegotiationSessions::new(config.negotiation_sessions),
            securid_sessions: NegotiationSessions::new(config.negotiation_sessions),
            config,
            services,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &StsConfig {
        &self.config
    }

    /// Pending SPNEGO negotiations.
    #[must_use]
    pub const fn spnego_sessions(&self) -> &NegotiationSessions {
        &self.spnego_sessions
    }

    /// Pending SecurID challenges.
    #[must_use]
    pub const fn securid_sessions(&self) -> &NegotiationSessions {
        &self.securid_sessions
    }

    /// Issues a token, or starts a negotiation.
    #[instrument(skip_all, fields(context = request.rst.context.as_deref()))]
    pub async fn issue(&self, request: &Request) -> StsResult<IssueResponse> {
        check_request_type(request, request_type::ISSUE)?;
        if request.rst.delegate_to.is_some() && request.act_as_token.is_some() {
            return Err(StsError::request_failed(
                "The issue request is ambiguous - both 'RST::DelegateTo' and 'RST::ActAs' are present!",
            ));
        }
        self.check_lifetime(request, Utc::now())?;

        let outcome = self
            .services
            .authenticator
            .authenticate(request)
            .await?
            .ok_or_else(not_authenticated)?;

        self.process_issue(request, request, outcome, true).await
    }

    /// Renews the token in the request's renew target.
    #[instrument(skip_all)]
    pub async fn renew(&self, request: &Request) -> StsResult<IssuedToken> {
        check_request_type(request, request_type::RENEW)?;
        let target = request.rst.renew_target.clone().ok_or_else(|| {
            StsError::request_failed("The renew request does not contain token for renewal!")
        })?;
        self.check_lifetime(request, Utc::now())?;

        let outcome = self
            .services
            .authenticator
            .authenticate(request)
            .await?
            .ok_or_else(not_authenticated)?;
        let AuthOutcome::Completed(completed) = outcome else {
            return Err(AuthError::unsupported_token(
                "Negotiation is not supported in renew operation.",
            )
            .into());
        };
        if completed.method() == AuthnMethod::ExternalAssertion {
            return Err(AuthError::unsupported_token(
                "External assertion is not supported in renew operation.",
            )
            .into());
        }

        let mut spec = token_spec(request, &completed);
        spec.renew_of = Some(target);
        let issued = self.issue_token(&spec).await?;
        info!(principal = %issued.principal, "token renewed");
        Ok(issued)
    }

    /// Validates the token in the request's validate target.
    ///
    /// Returns whether the token is valid. A bad signature is an error, not
    /// an invalid token.
    #[instrument(skip_all)]
    pub async fn validate(&self, request: &Request) -> StsResult<bool> {
        check_request_type(request, request_type::VALIDATE)?;
        let target = request.rst.validate_target.as_ref().ok_or_else(|| {
            StsError::request_failed("The validate request does not contain token for validation!")
        })?;
        self.check_lifetime(request, Utc::now())?;

        match self.services.token_validator.validate(target).await {
            Ok(token) => {
                debug!(subject = %token.subject, "token is valid");
                Ok(true)
            }
            Err(err @ TokenError::InvalidSignature(_)) => {
                Err(StsError::invalid_signature("Token signature is invalid").with_source(err))
            }
            Err(err @ TokenError::InvalidToken(_)) => {
                debug!(error = %err, "token is not valid");
                Ok(false)
            }
        }
    }

    /// Continues a negotiation started by `issue`.
    ///
    /// The request carries the context and the next leg; the session saved by
    /// the first round supplies the original issue request.
    #[instrument(skip_all, fields(context = request.rst.context.as_deref()))]
    pub async fn challenge(&self, request: &Request) -> StsResult<IssueResponse> {
        let context = request
            .rst
            .context
            .as_deref()
            .filter(|context| !context.is_empty())
            .ok_or_else(|| StsError::request_failed("Bad request! Missing context value!"))?;
        let negotiating_gss = request.header.binary_security_token.is_some();
        if negotiating_gss
            && request
                .rst
                .binary_exchange
                .as_ref()
                .is_none_or(|exchange| exchange.value.is_empty())
        {
            return Err(StsError::InvalidSecurityHeader(
                "Bad request! Missing binary exchange!".to_string(),
            ));
        }
        self.check_lifetime(request, Utc::now())?;

        let sessions = if negotiating_gss {
            &self.spnego_sessions
        } else if request.header.username_token.is_some() {
            &self.securid_sessions
        } else {
            return Err(AuthError::unsupported_token(
                "Unsupported security token in challenge operation.",
            )
            .into());
        };
        let initial = sessions
            .retrieve(context)
            .ok_or_else(|| AuthError::invalid_credentials("Unknown session for challenge request!"))?;

        let outcome = self
            .services
            .authenticator
            .authenticate(request)
            .await?
            .ok_or_else(not_authenticated)?;
        if outcome.method() == AuthnMethod::ExternalAssertion {
            return Err(AuthError::unsupported_token(
                "External assertion is not supported in challenge operation.",
            )
            .into());
        }

        self.process_issue(&initial, request, outcome, false).await
    }

    async fn process_issue(
        &self,
        initial: &Request,
        current: &Request,
        outcome: AuthOutcome,
        first_round: bool,
    ) -> StsResult<IssueResponse> {
        match outcome {
            AuthOutcome::Completed(completed) => {
                debug!(
                    principal = %completed.principal(),
                    instant = %completed.instant(),
                    "authenticated"
                );
                self.check_permissions(initial, &completed).await?;

                // The caller echoes the session key as its context.
                if let Some(context) = current.rst.context.as_deref() {
                    match completed.method() {
                        AuthnMethod::TimeSyncToken => {
                            self.securid_sessions.remove(context);
                        }
                        AuthnMethod::Kerberos => {
                            self.spnego_sessions.remove(context);
                        }
                        _ => {}
                    }
                }

                let issued = self.issue_token(&token_spec(initial, &completed)).await?;
                info!(principal = %issued.principal, method = %issued.authn_method, "token issued");
                Ok(IssueResponse::Issued(issued))
            }
            AuthOutcome::Incomplete(pending) => self.continue_negotiation(initial, current, pending, first_round),
        }
    }

    fn continue_negotiation(
        &self,
        initial: &Request,
        current: &Request,
        pending: PendingAuth,
        first_round: bool,
    ) -> StsResult<IssueResponse> {
        match pending.method() {
            AuthnMethod::TimeSyncToken => {
                let session_id = pending
                    .session_id()
                    .ok_or_else(|| StsError::request_failed("Missing session id!"))?
                    .to_string();
                if first_round {
                    self.securid_sessions.save(session_id.clone(), initial.clone());
                }
                debug!(%session_id, "SecurID challenge issued");
                Ok(IssueResponse::SecurIdChallenge {
                    session_id,
                    message: String::from_utf8_lossy(pending.server_leg()).into_owned(),
                })
            }
            AuthnMethod::Kerberos => {
                let context = current
                    .rst
                    .context
                    .clone()
                    .ok_or_else(|| StsError::request_failed("Missing context!"))?;
                if first_round {
                    self.spnego_sessions.save(context.clone(), initial.clone());
                }
                debug!(%context, "SPNEGO negotiation continues");
                Ok(IssueResponse::Negotiation {
                    context,
                    server_leg: pending.server_leg().to_vec(),
                })
            }
            method => Err(StsError::request_failed(format!(
                "Negotiation is not supported for {method}"
            ))),
        }
    }

    async fn check_permissions(&self, request: &Request, completed: &CompletedAuth) -> StsResult<()> {
        if request.act_as_token.is_none() {
            return Ok(());
        }
        let member = self
            .services
            .discovery
            .is_member_of_system_group(completed.principal(), &self.config.act_as_group)
            .await
            .map_err(|err| match err {
                PrincipalError::InvalidPrincipal => {
                    StsError::invalid_request("The authenticated principal is no more accessible!")
                        .with_source(err)
                }
                other => StsError::from(AuthError::from(other)),
            })?;
        if member {
            Ok(())
        } else {
            Err(StsError::invalid_request("Access not authorized!"))
        }
    }

    async fn issue_token(&self, spec: &TokenSpec) -> StsResult<IssuedToken> {
        let token = self.services.authority.issue(spec).await?;
        Ok(IssuedToken {
            token,
            principal: spec.principal.clone(),
            authn_method: spec.authn_method,
            authn_instant: spec.authn_instant,
        })
    }

    /// Checks that `now` falls in the request timestamp's lifetime widened by
    /// the clock tolerance on both ends.
    fn check_lifetime(&self, request: &Request, now: DateTime<Utc>) -> StsResult<()> {
        let timestamp = request
            .header
            .timestamp
            .ok_or_else(|| StsError::invalid_security("Request has no timestamp"))?;
        let expires = timestamp
            .expires
            .ok_or_else(|| StsError::invalid_security("Request timestamp has no expiry"))?;

        let tolerance = TimeDelta::from_std(self.config.clock_tolerance()).unwrap_or(TimeDelta::MAX);
        let start = timestamp
            .created
            .checked_sub_signed(tolerance)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = expires
            .checked_add_signed(tolerance)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        if start <= now && now < end {
            debug!(%start, %end, %now, "request lifetime accepted");
            return Ok(());
        }
        error!(
            %now,
            clock_tolerance_ms = self.config.clock_tolerance_ms,
            %start,
            %end,
            "current time is outside the request lifetime; this might be a clock skew problem"
        );
        Err(StsError::RequestExpired(format!(
            "The time now {now} does not fall in the request lifetime interval extended with clock tolerance of {} ms: [ {start}; {end}). This might be due to a clock skew problem.",
            self.config.clock_tolerance_ms
        )))
    }
}

fn check_request_type(request: &Request, expected: &str) -> StsResult<()> {
    if request.rst.request_type == expected {
        Ok(())
    } else {
        Err(StsError::invalid_request(
            "RequestType is different than operation executed.",
        ))
    }
}

fn not_authenticated() -> AuthError {
    AuthError::invalid_credentials("Request not authenticated!")
}

fn token_spec(request: &Request, completed: &CompletedAuth) -> TokenSpec {
    TokenSpec {
        principal: completed.principal().clone(),
        authn_method: completed.method(),
        authn_instant: completed.instant(),
        lifetime: request.rst.lifetime,
        delegate_to: request.rst.delegate_to.clone(),
        delegatable: request.rst.delegatable,
        act_as: request.act_as_token.clone(),
        renew_of: None,
    }
}
