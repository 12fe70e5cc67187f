//! Signature verification against certificate public keys.
//!
//! ECDSA signatures use the fixed-width `r || s` encoding mandated by
//! XML-DSig, not ASN.1.

use aws_lc_rs::signature::{self, UnparsedPublicKey, VerificationAlgorithm};

use crate::algorithm::SignatureAlgorithm;
use crate::certificate::{Certificate, EcCurve, PublicKey};
use crate::error::{CryptoError, CryptoResult};

/// Verifies `sig` over `data` with the certificate's public key.
///
/// # Errors
///
/// - [`CryptoError::UnsupportedAlgorithm`] if the key type or curve does not
///   match the algorithm
/// - [`CryptoError::Verification`] if the signature does not verify
pub fn verify(
    certificate: &Certificate,
    algorithm: SignatureAlgorithm,
    data: &[u8],
    sig: &[u8],
) -> CryptoResult<()> {
    let (verification_alg, key_bytes) = select(certificate.public_key(), algorithm)?;
    let public_key = UnparsedPublicKey::new(verification_alg, key_bytes);

    public_key
        .verify(data, sig)
        .map_err(|_| CryptoError::Verification)
}

fn select(
    key: &PublicKey,
    algorithm: SignatureAlgorithm,
) -> CryptoResult<(&'static dyn VerificationAlgorithm, &[u8])> {
    let chosen: &'static dyn VerificationAlgorithm = match (key, algorithm) {
        (PublicKey::Rsa(_), SignatureAlgorithm::RsaSha1) => {
            &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY
        }
        (PublicKey::Rsa(_), SignatureAlgorithm::RsaSha256) => &signature::RSA_PKCS1_2048_8192_SHA256,
        (PublicKey::Rsa(_), SignatureAlgorithm::RsaSha384) => &signature::RSA_PKCS1_2048_8192_SHA384,
        (PublicKey::Rsa(_), SignatureAlgorithm::RsaSha512) => &signature::RSA_PKCS1_2048_8192_SHA512,
        (
            PublicKey::Ec {
                curve: EcCurve::P256,
                ..
            },
            SignatureAlgorithm::EcdsaSha256,
        ) => &signature::ECDSA_P256_SHA256_FIXED,
        (
            PublicKey::Ec {
                curve: EcCurve::P384,
                ..
            },
            SignatureAlgorithm::EcdsaSha384,
        ) => &signature::ECDSA_P384_SHA384_FIXED,
        (
            PublicKey::Ec {
                curve: EcCurve::P521,
                ..
            },
            SignatureAlgorithm::EcdsaSha512,
        ) => &signature::ECDSA_P521_SHA512_FIXED,
        (PublicKey::Unsupported, _) => {
            return Err(CryptoError::UnsupportedAlgorithm(
                "certificate key type is not supported".to_string(),
            ));
        }
        (key, algorithm) => {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "{} cannot be used with {}",
                algorithm.uri(),
                describe(key)
            )));
        }
    };

    let bytes = match key {
        PublicKey::Rsa(der) => der.as_slice(),
        PublicKey::Ec { point, .. } => point.as_slice(),
        PublicKey::Unsupported => &[],
    };
    Ok((chosen, bytes))
}

fn describe(key: &PublicKey) -> &'static str {
    match key {
        PublicKey::Rsa(_) => "an RSA key",
        PublicKey::Ec {
            curve: EcCurve::P256,
            ..
        } => "a P-256 key",
        PublicKey::Ec {
            curve: EcCurve::P384,
            ..
        } => "a P-384 key",
        PublicKey::Ec {
            curve: EcCurve::P521,
            ..
        } => "a P-521 key",
        PublicKey::Unsupported => "an unsupported key",
    }
}
