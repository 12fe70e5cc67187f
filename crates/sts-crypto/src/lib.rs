//! # sts-crypto
//!
//! Cryptographic primitives for the Security Token Service, built on
//! aws-lc-rs and x509-parser.
//!
//! - Digests for XML-DSig references (SHA-1 legacy, SHA-256/384/512)
//! - RSA PKCS#1 v1.5 and ECDSA verification against certificate keys
//! - [`Certificate`], an X.509 wrapper that preserves the exact DER bytes
//!
//! Only verification is offered; the service never signs with a caller's key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod certificate;
pub mod error;
pub mod hash;
pub mod signature;

pub use algorithm::{DigestAlgorithm, KeyFamily, SignatureAlgorithm};
pub use certificate::{Certificate, EcCurve, PublicKey};
pub use error::{CryptoError, CryptoResult};
pub use hash::{constant_time_eq, hash, sha256};
pub use signature::verify;
