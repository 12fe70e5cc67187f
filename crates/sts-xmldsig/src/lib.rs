//! # sts-xmldsig
//!
//! XML signature support for WS-Security requests.
//!
//! - [`Document`]: an arena DOM parsed with quick-xml that refuses DOCTYPE
//!   declarations and duplicate element IDs
//! - [`c14n`]: Exclusive XML Canonicalization with `InclusiveNamespaces`
//! - [`SignedDocument`]: the capability the validator is written against
//! - [`SignatureValidator`]: signature, reference and coverage checks, plus
//!   signer resolution through `wsse:SecurityTokenReference`
//!
//! ## Example
//!
//! ```no_run
//! use sts_xmldsig::SignatureValidator;
//!
//! # fn run(envelope: &str) -> Result<(), sts_core::WsFault> {
//! let signer = SignatureValidator::new().validate_envelope(envelope)?;
//! println!("signed by {}", signer.certificate().subject_dn());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod c14n;
pub mod document;
pub mod dom;
pub mod error;
pub mod keyinfo;
pub mod signed_info;
pub mod types;
pub mod validator;

#[cfg(test)]
pub(crate) mod testutil;

pub use document::{LeadingChild, SignedDocument};
pub use dom::{Attribute, Document, Element, NodeId, NodeKind};
pub use error::{XmlError, XmlResult};
pub use keyinfo::{CertificateLocation, Signature, extract_signer};
pub use signed_info::{Reference, SignedInfo, Transform};
pub use validator::SignatureValidator;
