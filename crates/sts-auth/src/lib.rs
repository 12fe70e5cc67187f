//! # sts-auth
//!
//! Authentication pipeline of the Security Token Service.
//!
//! Each credential scheme is an [`Authenticator`] that inspects a
//! [`Request`] and answers with nothing (credential not presented), an
//! [`AuthOutcome`], or an [`AuthError`]. The [`CompositeAuthenticator`]
//! runs every configured scheme and merges the answers.
//!
//! ## Schemes
//!
//! - [`UntAuthenticator`]: username token with a password or SecurID passcode
//! - [`BstAuthenticator`]: solution users signing with a binary security token
//! - [`SamlAuthenticator`]: bearer and holder-of-key SAML assertions
//! - [`GssAuthenticator`]: multi-round Kerberos/SPNEGO negotiation
//! - [`UserCertAuthenticator`]: client certificates with a self-signed proof
//!
//! Directory lookups and token validation are reached through the
//! [`PrincipalDiscovery`] and [`TokenValidator`] traits.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sts_auth::{Authenticator, CompositeAuthenticator, UntAuthenticator, BstAuthenticator};
//!
//! let composite = CompositeAuthenticator::new(vec![
//!     Arc::new(UntAuthenticator::new(directory.clone())),
//!     Arc::new(BstAuthenticator::new(directory)),
//! ]);
//! match composite.authenticate(&request).await? {
//!     Some(outcome) => println!("{}", outcome.method()),
//!     None => println!("anonymous"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authenticator;
pub mod composite;
pub mod error;
pub mod outcome;
pub mod principal;
pub mod request;
pub mod schemes;
pub mod token;

#[cfg(test)]
pub(crate) mod testutil;

pub use authenticator::Authenticator;
pub use composite::{CompositeAuthenticator, merge};
pub use error::{AuthError, AuthResult};
pub use outcome::{AuthOutcome, AuthnMethod, CompletedAuth, PendingAuth};
pub use principal::{
    GssOutcome, PasscodeOutcome, PrincipalDiscovery, PrincipalError, PrincipalId, SolutionUser,
};
pub use request::{
    BinaryExchange, BinarySecurityToken, Lifetime, Request, RequestSecurityToken, SecurityHeader,
    Timestamp, TokenValue, UserCertificateToken, UsernameToken, request_type,
};
pub use schemes::{
    BstAuthenticator, GssAuthenticator, SPNEGO_VALUE_TYPE, SamlAuthenticator, UntAuthenticator,
    UserCertAuthenticator,
};
pub use token::{Confirmation, SamlToken, TokenError, TokenValidator, ValidatedToken};
