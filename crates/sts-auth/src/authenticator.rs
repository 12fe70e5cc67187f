//! Authenticator trait.

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::outcome::AuthOutcome;
use crate::request::Request;

/// A credential scheme.
///
/// Returns `Ok(None)` when the request carries no credential of this scheme,
/// an outcome when it does and the credential checks out, and an error
/// otherwise.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the authenticator ID.
    fn id(&self) -> &'static str;

    /// Authenticates the request.
    async fn authenticate(&self, request: &Request) -> AuthResult<Option<AuthOutcome>>;
}
