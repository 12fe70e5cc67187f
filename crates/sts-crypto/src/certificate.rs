//! X.509 certificates.
//!
//! [`Certificate`] keeps the exact DER encoding it was built from, so two
//! certificates compare equal only when their encodings are byte-identical.
//! Fields needed by the authenticators are extracted once at construction.

use std::fmt;

use base64::Engine;
use chrono::{DateTime, Utc};
use x509_parser::prelude::{FromDer, X509Certificate};
use x509_parser::public_key::PublicKey as ParsedKey;

use crate::error::{CryptoError, CryptoResult};

/// Named elliptic curves, identified by their uncompressed point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    /// NIST P-256.
    P256,
    /// NIST P-384.
    P384,
    /// NIST P-521.
    P521,
}

impl EcCurve {
    fn from_point_len(len: usize) -> Option<Self> {
        match len {
            65 => Some(Self::P256),
            97 => Some(Self::P384),
            133 => Some(Self::P521),
            _ => None,
        }
    }
}

/// Subject public key material in the form the verifier consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// PKCS#1 `RSAPublicKey` DER.
    Rsa(Vec<u8>),
    /// Uncompressed EC point.
    Ec {
        /// Curve of the point.
        curve: EcCurve,
        /// `0x04 || X || Y`.
        point: Vec<u8>,
    },
    /// Any key type the verifier does not handle.
    Unsupported,
}

/// A parsed X.509 certificate.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    public_key: PublicKey,
}

impl Certificate {
    /// Parses a DER encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidCertificate`] if the encoding is not a
    /// single well-formed certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let der = der.into();
        let (rest, cert) = X509Certificate::from_der(&der)
            .map_err(|e| CryptoError::InvalidCertificate(format!("failed to parse certificate: {e}")))?;
        if !rest.is_empty() {
            return Err(CryptoError::InvalidCertificate(
                "trailing data after certificate".to_string(),
            ));
        }

        let not_before = to_utc(cert.validity().not_before.timestamp())?;
        let not_after = to_utc(cert.validity().not_after.timestamp())?;

        let spki = cert.public_key();
        let key_bytes = spki.subject_public_key.data.to_vec();
        let public_key = match spki.parsed() {
            Ok(ParsedKey::RSA(_)) => PublicKey::Rsa(key_bytes),
            Ok(ParsedKey::EC(_)) => match EcCurve::from_point_len(key_bytes.len()) {
                Some(curve) => PublicKey::Ec {
                    curve,
                    point: key_bytes,
                },
                None => PublicKey::Unsupported,
            },
            _ => PublicKey::Unsupported,
        };

        let subject = cert.subject().to_string();
        let issuer = cert.issuer().to_string();

        Ok(Self {
            der,
            subject,
            issuer,
            not_before,
            not_after,
            public_key,
        })
    }

    /// Parses base64 encoded DER, ignoring embedded whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not base64 or the DER does not parse.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let der = base64::engine::general_purpose::STANDARD.decode(compact)?;
        Self::from_der(der)
    }

    /// DER encoding as received.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name.
    #[must_use]
    pub fn subject_dn(&self) -> &str {
        &self.subject
    }

    /// Issuer distinguished name.
    #[must_use]
    pub fn issuer_dn(&self) -> &str {
        &self.issuer
    }

    /// Start of the validity window.
    #[must_use]
    pub const fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of the validity window.
    #[must_use]
    pub const fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Returns true if `instant` lies inside the validity window.
    #[must_use]
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_before <= instant && instant <= self.not_after
    }

    /// Subject public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Base64 form of the DER encoding.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.der)
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

fn to_utc(timestamp: i64) -> CryptoResult<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        CryptoError::InvalidCertificate(format!("validity timestamp out of range: {timestamp}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(common_name: &str) -> rcgen::Certificate {
        let mut params = rcgen::CertificateParams::new(vec!["sts.example.com".to_string()]);
        params.distinguished_name = rcgen::DistinguishedName::new();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, common_name);
        rcgen::Certificate::from_params(params).unwrap()
    }

    #[test]
    fn parses_generated_certificate() {
        let cert = generated("svc-user");
        let der = cert.serialize_der().unwrap();
        let parsed = Certificate::from_der(der.clone()).unwrap();

        assert_eq!(parsed.der(), der.as_slice());
        assert!(parsed.subject_dn().contains("svc-user"));
        assert!(parsed.is_valid_at(Utc::now()));
        assert!(matches!(
            parsed.public_key(),
            PublicKey::Ec {
                curve: EcCurve::P256,
                ..
            }
        ));
    }

    #[test]
    fn base64_form_matches_der() {
        // rcgen re-signs on every serialize call, so encode once.
        let der = generated("b64-user").serialize_der().unwrap();
        let from_der = Certificate::from_der(der.clone()).unwrap();

        let wrapped = from_der
            .to_base64()
            .as_bytes()
            .chunks(64)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let from_b64 = Certificate::from_base64(&wrapped).unwrap();

        assert_eq!(from_b64.der(), der.as_slice());
        assert_eq!(from_der, from_b64);
    }

    #[test]
    fn equality_is_by_encoding() {
        let a = Certificate::from_der(generated("same").serialize_der().unwrap()).unwrap();
        let b = Certificate::from_der(generated("same").serialize_der().unwrap()).unwrap();
        assert_eq!(a.subject_dn(), b.subject_dn());
        assert_ne!(a, b);
    }

    #[test]
    fn expired_window_is_detected() {
        let mut params = rcgen::CertificateParams::new(vec![]);
        params.not_before = rcgen::date_time_ymd(2000, 1, 1);
        params.not_after = rcgen::date_time_ymd(2001, 1, 1);
        let cert = rcgen::Certificate::from_params(params).unwrap();
        let parsed = Certificate::from_der(cert.serialize_der().unwrap()).unwrap();
        assert!(!parsed.is_valid_at(Utc::now()));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Certificate::from_der(vec![0x30, 0x03, 0x01]),
            Err(CryptoError::InvalidCertificate(_))
        ));
        assert!(Certificate::from_base64("***").is_err());
    }
}
