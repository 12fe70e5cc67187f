//! Composite authentication.
//!
//! Every configured scheme runs against the request and the outcomes are
//! reduced to one:
//!
//! - any error aborts the whole call;
//! - no outcome at all is `None`, not an error;
//! - completed outcomes must agree on the principal, and the latest
//!   authentication instant wins;
//! - a completed outcome beats an incomplete one;
//! - at most one negotiation may be in flight.
//!
//! The reduction does not depend on the order the schemes finish in.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::authenticator::Authenticator;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{AuthOutcome, CompletedAuth, PendingAuth};
use crate::request::Request;

/// Runs a fixed set of authenticators and merges their outcomes.
pub struct CompositeAuthenticator {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl CompositeAuthenticator {
    /// Creates a composite over the given schemes.
    #[must_use]
    pub fn new(authenticators: Vec<Arc<dyn Authenticator>>) -> Self {
        Self { authenticators }
    }

    /// Adds a scheme.
    #[must_use]
    pub fn with(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticators.push(authenticator);
        self
    }

    /// IDs of the configured schemes.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.authenticators.iter().map(|auth| auth.id())
    }
}

#[async_trait]
impl Authenticator for CompositeAuthenticator {
    fn id(&self) -> &'static str {
        "composite"
    }

    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>> {
        let results = try_join_all(self.authenticators.iter().map(|auth| async move {
            auth.authenticate(request)
                .await
                .inspect_err(|err| debug!(authenticator = auth.id(), error = %err, "authenticator failed"))
        }))
        .await?;

        merge(results)
    }
}

/// Reduces scheme outcomes to a single outcome.
///
/// # Errors
///
/// `InvalidCredentials` when completed outcomes name different principals,
/// or when more than one negotiation is in progress.
pub fn merge(
    results: impl IntoIterator<Item = Option<AuthOutcome>>,
) -> AuthResult<Option<AuthOutcome>> {
    let mut completed: Vec<CompletedAuth> = Vec::new();
    let mut pending: Vec<PendingAuth> = Vec::new();

    for outcome in results.into_iter().flatten() {
        match outcome {
            AuthOutcome::Completed(done) => completed.push(done),
            AuthOutcome::Incomplete(next) => pending.push(next),
        }
    }

    if let Some(first) = completed.first() {
        if let Some(other) = completed
            .iter()
            .find(|done| done.principal() != first.principal())
        {
            warn!(
                first = %first.principal(),
                second = %other.principal(),
                "authenticators resolved different principals"
            );
            return Err(AuthError::invalid_credentials(
                "Request resolves to more than one principal",
            ));
        }
    }

    if pending.len() > 1 {
        warn!(count = pending.len(), "more than one negotiation in progress");
        return Err(AuthError::invalid_credentials(
            "More than one authentication negotiation in progress",
        ));
    }

    // Equal instants fall back to the method order.
    if let Some(winner) = completed
        .into_iter()
        .max_by_key(|done| (done.instant(), done.method()))
    {
        debug!(principal = %winner.principal(), method = %winner.method(), "request authenticated");
        return Ok(Some(AuthOutcome::Completed(winner)));
    }

    Ok(pending.pop().map(AuthOutcome::Incomplete))
}
