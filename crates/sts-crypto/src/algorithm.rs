//! XML-DSig digest and signature algorithm identifiers.
//!
//! SHA-1 based algorithms are recognised so that they can be rejected with a
//! precise error, or accepted when a deployment explicitly allows them.

use serde::{Deserialize, Serialize};

/// Digest method URIs.
pub mod digest_uris {
    /// SHA-1.
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
    /// SHA-256.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
    /// SHA-384.
    pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
    /// SHA-512.
    pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
}

/// Signature method URIs.
pub mod signature_uris {
    /// RSA PKCS#1 v1.5 with SHA-1.
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
    /// RSA PKCS#1 v1.5 with SHA-256.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
    /// RSA PKCS#1 v1.5 with SHA-384.
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
    /// RSA PKCS#1 v1.5 with SHA-512.
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
    /// ECDSA with SHA-256.
    pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
    /// ECDSA with SHA-384.
    pub const ECDSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384";
    /// ECDSA with SHA-512.
    pub const ECDSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha512";
}

/// Digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-1 (legacy).
    #[serde(rename = "SHA1")]
    Sha1,
    /// SHA-256.
    #[serde(rename = "SHA256")]
    Sha256,
    /// SHA-384.
    #[serde(rename = "SHA384")]
    Sha384,
    /// SHA-512.
    #[serde(rename = "SHA512")]
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Returns the XML-DSig URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Sha1 => digest_uris::SHA1,
            Self::Sha256 => digest_uris::SHA256,
            Self::Sha384 => digest_uris::SHA384,
            Self::Sha512 => digest_uris::SHA512,
        }
    }

    /// Parses a digest method URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            digest_uris::SHA1 => Some(Self::Sha1),
            digest_uris::SHA256 => Some(Self::Sha256),
            digest_uris::SHA384 => Some(Self::Sha384),
            digest_uris::SHA512 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Returns true for SHA-1.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Sha1)
    }
}

/// Key family a signature algorithm operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyFamily {
    /// RSA keys.
    Rsa,
    /// Elliptic curve keys.
    Ec,
}

/// Signature algorithms accepted in `ds:SignatureMethod` and user
/// certificate tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-1 (legacy).
    #[serde(rename = "RS1")]
    RsaSha1,
    /// RSA PKCS#1 v1.5 with SHA-256.
    #[serde(rename = "RS256")]
    RsaSha256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    #[serde(rename = "RS384")]
    RsaSha384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    #[serde(rename = "RS512")]
    RsaSha512,
    /// ECDSA with SHA-256.
    #[serde(rename = "ES256")]
    EcdsaSha256,
    /// ECDSA with SHA-384.
    #[serde(rename = "ES384")]
    EcdsaSha384,
    /// ECDSA with SHA-512.
    #[serde(rename = "ES512")]
    EcdsaSha512,
}

impl SignatureAlgorithm {
    /// Returns the XML-DSig URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::RsaSha1 => signature_uris::RSA_SHA1,
            Self::RsaSha256 => signature_uris::RSA_SHA256,
            Self::RsaSha384 => signature_uris::RSA_SHA384,
            Self::RsaSha512 => signature_uris::RSA_SHA512,
            Self::EcdsaSha256 => signature_uris::ECDSA_SHA256,
            Self::EcdsaSha384 => signature_uris::ECDSA_SHA384,
            Self::EcdsaSha512 => signature_uris::ECDSA_SHA512,
        }
    }

    /// Parses a signature method URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_uris::RSA_SHA1 => Some(Self::RsaSha1),
            signature_uris::RSA_SHA256 => Some(Self::RsaSha256),
            signature_uris::RSA_SHA384 => Some(Self::RsaSha384),
            signature_uris::RSA_SHA512 => Some(Self::RsaSha512),
            signature_uris::ECDSA_SHA256 => Some(Self::EcdsaSha256),
            signature_uris::ECDSA_SHA384 => Some(Self::EcdsaSha384),
            signature_uris::ECDSA_SHA512 => Some(Self::EcdsaSha512),
            _ => None,
        }
    }

    /// Returns the digest the signature is computed over.
    #[must_use]
    pub const fn digest(self) -> DigestAlgorithm {
        match self {
            Self::RsaSha1 => DigestAlgorithm::Sha1,
            Self::RsaSha256 | Self::EcdsaSha256 => DigestAlgorithm::Sha256,
            Self::RsaSha384 | Self::EcdsaSha384 => DigestAlgorithm::Sha384,
            Self::RsaSha512 | Self::EcdsaSha512 => DigestAlgorithm::Sha512,
        }
    }

    /// Returns the key family.
    #[must_use]
    pub const fn key_family(self) -> KeyFamily {
        match self {
            Self::RsaSha1 | Self::RsaSha256 | Self::RsaSha384 | Self::RsaSha512 => KeyFamily::Rsa,
            Self::EcdsaSha256 | Self::EcdsaSha384 | Self::EcdsaSha512 => KeyFamily::Ec,
        }
    }

    /// Returns true if this algorithm relies on SHA-1.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        self.digest().is_legacy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_uri_roundtrip() {
        for alg in [
            SignatureAlgorithm::RsaSha1,
            SignatureAlgorithm::RsaSha256,
            SignatureAlgorithm::EcdsaSha384,
            SignatureAlgorithm::EcdsaSha512,
        ] {
            assert_eq!(SignatureAlgorithm::from_uri(alg.uri()), Some(alg));
        }
        assert_eq!(SignatureAlgorithm::from_uri("urn:unknown"), None);
    }

    #[test]
    fn digest_lookup() {
        assert_eq!(
            DigestAlgorithm::from_uri("http://www.w3.org/2001/04/xmlenc#sha256"),
            Some(DigestAlgorithm::Sha256)
        );
        assert_eq!(DigestAlgorithm::Sha384.output_len(), 48);
        assert!(DigestAlgorithm::Sha1.is_legacy());
    }

    #[test]
    fn algorithm_properties() {
        assert!(SignatureAlgorithm::RsaSha1.is_legacy());
        assert!(!SignatureAlgorithm::RsaSha256.is_legacy());
        assert_eq!(SignatureAlgorithm::EcdsaSha256.key_family(), KeyFamily::Ec);
        assert_eq!(SignatureAlgorithm::RsaSha512.digest(), DigestAlgorithm::Sha512);
    }
}
