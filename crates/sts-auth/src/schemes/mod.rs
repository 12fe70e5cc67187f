//! Credential scheme authenticators.

mod bst;
mod gss;
mod saml;
mod unt;
mod user_cert;

pub use bst::BstAuthenticator;
pub use gss::{GssAuthenticator, SPNEGO_VALUE_TYPE};
pub use saml::SamlAuthenticator;
pub use unt::UntAuthenticator;
pub use user_cert::UserCertAuthenticator;
