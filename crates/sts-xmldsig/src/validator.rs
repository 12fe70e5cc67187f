//! WS-Security signature validation.
//!
//! A request signature is accepted only when all of the following hold:
//! - SignedInfo is canonicalized with exclusive c14n and verifies against
//!   the certificate named by the key info;
//! - every reference is a same-document `#id` with at most one exclusive
//!   c14n transform and a matching digest;
//! - the references cover the `wsu:Timestamp` and either the SOAP Body or
//!   the WS-Trust element that is the Body's first child.

use std::collections::HashSet;
use std::hash::Hash;

use sts_core::{FaultKey, StsConfig, WsFault};
use sts_crypto::{CryptoError, DigestAlgorithm, SignatureAlgorithm, constant_time_eq, hash};
use tracing::{debug, warn};

use crate::c14n;
use crate::document::{LeadingChild, SignedDocument};
use crate::dom::Document;
use crate::keyinfo::{Signature, extract_signer};
use crate::signed_info::{Reference, SignedInfo};
use crate::types::ns;

const COVERAGE_MESSAGE: &str =
    "Signature must include <wsu:Timestamp> and either SoapBody, or the WSTrust element within it.";

/// Validates the signature in a `wsse:Security` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureValidator {
    allow_sha1: bool,
}

impl SignatureValidator {
    /// Creates a validator that refuses SHA-1 digests and signatures.
    #[must_use]
    pub const fn new() -> Self {
        Self { allow_sha1: false }
    }

    /// Accepts or refuses SHA-1 based algorithms.
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Creates a validator from service configuration.
    #[must_use]
    pub const fn from_config(config: &StsConfig) -> Self {
        Self::new().allow_sha1(config.allow_sha1)
    }

    /// Validates the signature inside `security` and returns the signer.
    ///
    /// # Errors
    ///
    /// Returns a [`WsFault`] describing the first rule the signature breaks.
    pub fn validate<D>(&self, doc: &D, security: D::Node) -> Result<Signature, WsFault>
    where
        D: SignedDocument,
        D::Node: Hash,
    {
        let signature_node = header_child(doc, security, "Signature")?;
        let timestamp = header_child(doc, security, "Timestamp")?;

        let signer = extract_signer(doc, security, signature_node)?;
        let signed_info = SignedInfo::parse(doc, signature_node)
            .map_err(|err| WsFault::new(FaultKey::WsseFailedCheck, "Signature is invalid.").with_source(err))?;

        self.verify_signed_info(doc, &signed_info, &signer)?;
        let covered = self.verify_references(doc, &signed_info.references)?;
        check_coverage(doc, &covered, timestamp)?;

        debug!(
            subject = %signer.certificate().subject_dn(),
            location = %signer.location(),
            "request signature validated"
        );
        Ok(signer)
    }

    /// Parses a SOAP 1.1 envelope and validates the signature in its security header.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSecurity` when the envelope cannot be parsed or has no
    /// security header, otherwise the faults of [`Self::validate`].
    pub fn validate_envelope(&self, xml: &str) -> Result<Signature, WsFault> {
        let doc = Document::parse(xml).map_err(|err| {
            WsFault::new(FaultKey::WsseInvalidSecurity, "Malformed SOAP message.").with_source(err)
        })?;

        let envelope = SignedDocument::document_element(&doc);
        if !doc.is_element(envelope, ns::SOAP11, "Envelope") {
            return Err(missing_node("Envelope"));
        }
        let header = doc
            .children_named(envelope, ns::SOAP11, "Header")
            .first()
            .copied()
            .ok_or_else(|| missing_node("Header"))?;
        let security = doc
            .children_named(header, ns::WSSE, "Security")
            .first()
            .copied()
            .ok_or_else(|| missing_node("Security"))?;

        self.validate(&doc, security)
    }

    fn verify_signed_info<D: SignedDocument>(
        &self,
        doc: &D,
        signed_info: &SignedInfo<D::Node>,
        signer: &Signature,
    ) -> Result<(), WsFault> {
        if !c14n::is_exclusive(&signed_info.canonicalization) {
            warn!(method = %signed_info.canonicalization, "rejected canonicalization method");
            return Err(failed_check(format!(
                "Unsupported canonicalization method '{}'.",
                signed_info.canonicalization
            )));
        }

        let algorithm = SignatureAlgorithm::from_uri(&signed_info.signature_method).ok_or_else(|| {
            failed_check(format!(
                "Unsupported signature method '{}'.",
                signed_info.signature_method
            ))
        })?;
        if algorithm.is_legacy() && !self.allow_sha1 {
            return Err(WsFault::new(
                FaultKey::WsseUnsupportedAlgorithm,
                format!("Signature method '{}' is not allowed.", algorithm.uri()),
            ));
        }

        let canonical = doc
            .canonicalize(signed_info.node, &signed_info.inclusive_prefixes)
            .map_err(|err| failed_check("Signature is invalid.").with_source(err))?;

        sts_crypto::verify(
            signer.certificate(),
            algorithm,
            &canonical,
            &signed_info.signature_value,
        )
        .map_err(|err| {
            warn!(error = %err, "request signature did not verify");
            match err {
                CryptoError::Verification => failed_check("Signature is invalid."),
                other => failed_check("Signature is invalid.").with_source(other),
            }
        })
    }

    fn verify_references<D>(
        &self,
        doc: &D,
        references: &[Reference],
    ) -> Result<HashSet<D::Node>, WsFault>
    where
        D: SignedDocument,
        D::Node: Hash,
    {
        if references.is_empty() {
            return Err(failed_check(
                "Signature's SignedInfo does not contain any references.",
            ));
        }

        let mut covered = HashSet::new();
        for reference in references {
            let target = self.verify_reference(doc, reference)?;
            covered.insert(target);
        }
        Ok(covered)
    }

    fn verify_reference<D: SignedDocument>(
        &self,
        doc: &D,
        reference: &Reference,
    ) -> Result<D::Node, WsFault> {
        let uri = reference.uri.as_str();

        let inclusive_prefixes: &[String] = match reference.transforms.as_slice() {
            [] => &[],
            [transform] if c14n::is_exclusive(&transform.algorithm) => &transform.inclusive_prefixes,
            _ => {
                warn!(%uri, "rejected reference transforms");
                return Err(failed_check(format!(
                    "Signature reference '{uri}' must use a single exclusive canonicalization transform."
                )));
            }
        };

        let Some(id) = reference.fragment() else {
            warn!(%uri, "rejected non same-document reference");
            return Err(failed_check(format!(
                "Signature reference '{uri}' is not a same-document reference."
            )));
        };
        let target = doc
            .element_by_id(id)
            .ok_or_else(|| failed_check(format!("Signature reference '{uri}' cannot be resolved.")))?;

        let digest = DigestAlgorithm::from_uri(&reference.digest_method).ok_or_else(|| {
            failed_check(format!(
                "Unsupported digest method '{}'.",
                reference.digest_method
            ))
        })?;
        if digest.is_legacy() && !self.allow_sha1 {
            return Err(WsFault::new(
                FaultKey::WsseUnsupportedAlgorithm,
                format!("Digest method '{}' is not allowed.", digest.uri()),
            ));
        }

        let canonical = doc
            .canonicalize(target, inclusive_prefixes)
            .map_err(|err| failed_check(format!("Signature reference '{uri}' is invalid.")).with_source(err))?;
        if !constant_time_eq(&hash(digest, &canonical), &reference.digest_value) {
            warn!(%uri, "reference digest mismatch");
            return Err(failed_check(format!(
                "Signature reference '{uri}' is invalid."
            )));
        }
        Ok(target)
    }
}

fn check_coverage<D>(doc: &D, covered: &HashSet<D::Node>, timestamp: D::Node) -> Result<(), WsFault>
where
    D: SignedDocument,
    D::Node: Hash,
{
    let bodies = doc.elements_by_name(ns::SOAP11, "Body");
    let [body] = bodies.as_slice() else {
        return Err(failed_check(format!(
            "Expected exactly one SOAP Body, found {}.",
            bodies.len()
        )));
    };
    let LeadingChild::Element(ws_trust) = doc.leading_child(*body) else {
        return Err(failed_check("SOAP Body must start with the WSTrust element."));
    };

    let body_covered = covered.contains(body) || covered.contains(&ws_trust);
    if covered.contains(&timestamp) && body_covered {
        Ok(())
    } else {
        warn!("signature does not cover the timestamp and the request body");
        Err(failed_check(COVERAGE_MESSAGE))
    }
}

fn header_child<D: SignedDocument>(doc: &D, security: D::Node, local_name: &str) -> Result<D::Node, WsFault> {
    doc.child_by_local_name(security, local_name)
        .ok_or_else(|| missing_node(local_name))
}

fn missing_node(local_name: &str) -> WsFault {
    WsFault::new(
        FaultKey::WsseInvalidSecurity,
        format!("XML node '{local_name}' cannot be found"),
    )
}

fn failed_check(message: impl Into<String>) -> WsFault {
    WsFault::new(FaultKey::WsseFailedCheck, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyinfo::CertificateLocation;
    use crate::testutil::{EnvelopeBuilder, KeyInfoKind};
    use crate::types::c14n as c14n_uris;
    use sts_crypto::algorithm::digest_uris;

    fn fault(xml: &str) -> (FaultKey, String) {
        let err = SignatureValidator::new().validate_envelope(xml).unwrap_err();
        (err.key(), err.message().unwrap_or_default().to_string())
    }

    #[test]
    fn deeply_nested_body_is_invalid_security() {
        let xml = format!(
            r#"<soap:Envelope xmlns:soap="{}"><soap:Header/><soap:Body>{}{}</soap:Body></soap:Envelope>"#,
            ns::SOAP11,
            "<a>".repeat(200_000),
            "</a>".repeat(200_000)
        );
        let (key, message) = fault(&xml);
        assert_eq!(key, FaultKey::WsseInvalidSecurity);
        assert_eq!(message, "Malformed SOAP message.");
    }

    #[test]
    fn accepts_timestamp_and_body() {
        let builder = EnvelopeBuilder::new();
        let xml = builder.build();
        let signer = SignatureValidator::new().validate_envelope(&xml).unwrap();
        assert_eq!(signer.location(), CertificateLocation::BinaryToken);
        assert_eq!(signer.certificate().der(), builder.certificate_der());
    }

    #[test]
    fn accepts_timestamp_and_ws_trust_element() {
        let xml = EnvelopeBuilder::new().references(&["#TS-1", "#RST-1"]).build();
        assert!(SignatureValidator::new().validate_envelope(&xml).is_ok());
    }

    #[test]
    fn accepts_holder_of_key_assertion_signer() {
        let xml = EnvelopeBuilder::new().key_info(KeyInfoKind::HolderOfKey).build();
        let signer = SignatureValidator::new().validate_envelope(&xml).unwrap();
        assert_eq!(signer.location(), CertificateLocation::Assertion);
    }

    #[test]
    fn accepts_inclusive_prefix_lists() {
        let xml = EnvelopeBuilder::new().transform_prefixes("wsu soap").build();
        assert!(SignatureValidator::new().validate_envelope(&xml).is_ok());
    }

    #[test]
    fn body_only_signature_is_rejected() {
        let xml = EnvelopeBuilder::new().references(&["#Body-1"]).build();
        assert_eq!(
            fault(&xml),
            (FaultKey::WsseFailedCheck, COVERAGE_MESSAGE.to_string())
        );
    }

    #[test]
    fn timestamp_only_signature_is_rejected() {
        let xml = EnvelopeBuilder::new().references(&["#TS-1"]).build();
        assert_eq!(fault(&xml).1, COVERAGE_MESSAGE);
    }

    #[test]
    fn external_reference_is_rejected() {
        let xml = EnvelopeBuilder::new()
            .references(&["#TS-1", "http://attacker.example/doc#Body-1"])
            .build();
        let (key, message) = fault(&xml);
        assert_eq!(key, FaultKey::WsseFailedCheck);
        assert!(message.contains("same-document"));
    }

    #[test]
    fn non_exclusive_transform_is_rejected() {
        let xml = EnvelopeBuilder::new()
            .transforms(&[c14n_uris::INCLUSIVE])
            .build();
        assert_eq!(fault(&xml).0, FaultKey::WsseFailedCheck);

        let xml = EnvelopeBuilder::new()
            .transforms(&[c14n_uris::EXCLUSIVE, c14n_uris::EXCLUSIVE])
            .build();
        assert!(fault(&xml).1.contains("single exclusive canonicalization"));
    }

    #[test]
    fn non_exclusive_canonicalization_is_rejected() {
        let xml = EnvelopeBuilder::new()
            .canonicalization(c14n_uris::EXCLUSIVE_WITH_COMMENTS)
            .build();
        let (key, message) = fault(&xml);
        assert_eq!(key, FaultKey::WsseFailedCheck);
        assert!(message.contains("canonicalization"));
    }

    #[test]
    fn tampered_body_fails_digest() {
        let xml = EnvelopeBuilder::new().build().replace("/Issue<", "/Renew<");
        assert_eq!(
            fault(&xml),
            (
                FaultKey::WsseFailedCheck,
                "Signature reference '#Body-1' is invalid.".to_string()
            )
        );
    }

    #[test]
    fn tampered_signature_value_fails() {
        let builder = EnvelopeBuilder::new();
        let xml = builder.build_with_signature_tampered();
        assert_eq!(
            fault(&xml),
            (FaultKey::WsseFailedCheck, "Signature is invalid.".to_string())
        );
    }

    #[test]
    fn duplicate_ids_are_rejected_before_validation() {
        let xml = EnvelopeBuilder::new().build().replace(
            "<soap:Header>",
            "<soap:Header><Wrapper wsu:Id=\"Body-1\"/>",
        );
        assert_eq!(fault(&xml).0, FaultKey::WsseInvalidSecurity);
    }

    #[test]
    fn missing_references_are_rejected() {
        let xml = EnvelopeBuilder::new().references(&[]).build();
        assert_eq!(
            fault(&xml).1,
            "Signature's SignedInfo does not contain any references."
        );
    }

    #[test]
    fn sha1_digest_depends_on_policy() {
        let xml = EnvelopeBuilder::new().digest_method(digest_uris::SHA1).build();
        assert_eq!(fault(&xml).0, FaultKey::WsseUnsupportedAlgorithm);
        assert!(
            SignatureValidator::new()
                .allow_sha1(true)
                .validate_envelope(&xml)
                .is_ok()
        );
    }

    #[test]
    fn missing_timestamp_is_invalid_security() {
        let xml = EnvelopeBuilder::new().without_timestamp().build();
        assert_eq!(
            fault(&xml),
            (
                FaultKey::WsseInvalidSecurity,
                "XML node 'Timestamp' cannot be found".to_string()
            )
        );
    }

    #[test]
    fn missing_security_header_is_invalid_security() {
        let xml = format!(
            r#"<soap:Envelope xmlns:soap="{}"><soap:Header/><soap:Body/></soap:Envelope>"#,
            ns::SOAP11
        );
        assert_eq!(
            fault(&xml),
            (
                FaultKey::WsseInvalidSecurity,
                "XML node 'Security' cannot be found".to_string()
            )
        );
        assert_eq!(fault("<not-xml").0, FaultKey::WsseInvalidSecurity);
    }

    #[test]
    fn body_must_start_with_an_element() {
        let xml = EnvelopeBuilder::new()
            .body_prefix("stray text")
            .references(&["#TS-1", "#Body-1"])
            .build();
        assert!(fault(&xml).1.contains("must start with the WSTrust element"));
    }

    #[test]
    fn from_config_reads_sha1_policy() {
        let mut config = StsConfig::for_testing();
        config.allow_sha1 = true;
        let xml = EnvelopeBuilder::new().digest_method(digest_uris::SHA1).build();
        assert!(
            SignatureValidator::from_config(&config)
                .validate_envelope(&xml)
                .is_ok()
        );
    }
}
