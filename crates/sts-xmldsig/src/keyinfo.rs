//! Signer certificate resolution through `ds:KeyInfo`.
//!
//! The `wsse:SecurityTokenReference` inside the signature's key info either
//! references a `wsse:BinarySecurityToken` in the same security header or
//! identifies a holder-of-key SAML assertion whose confirmation data holds
//! the certificate.

use std::fmt;

use sts_core::{FaultKey, WsFault};
use sts_crypto::Certificate;
use tracing::debug;

use crate::document::SignedDocument;
use crate::types::{ns, token};

/// Where the signing certificate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateLocation {
    /// Subject confirmation data of a holder-of-key SAML assertion.
    Assertion,
    /// A binary security token in the security header.
    BinaryToken,
}

impl fmt::Display for CertificateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assertion => f.write_str("ASSERTION"),
            Self::BinaryToken => f.write_str("BINARY_TOKEN"),
        }
    }
}

/// The certificate a request was signed with, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    certificate: Certificate,
    location: CertificateLocation,
}

impl Signature {
    /// Creates a signature descriptor.
    #[must_use]
    pub const fn new(certificate: Certificate, location: CertificateLocation) -> Self {
        Self {
            certificate,
            location,
        }
    }

    /// The signer certificate.
    #[must_use]
    pub const fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Where the certificate was found.
    #[must_use]
    pub const fn location(&self) -> CertificateLocation {
        self.location
    }
}

/// Resolves the signer certificate referenced by `signature`.
///
/// `security` is the `wsse:Security` header that holds the referenced token.
///
/// # Errors
///
/// Returns a [`WsFault`] whose key names the structural expectation that failed.
pub fn extract_signer<D: SignedDocument>(
    doc: &D,
    security: D::Node,
    signature: D::Node,
) -> Result<Signature, WsFault> {
    let key_info = doc
        .children_named(signature, ns::DSIG, "KeyInfo")
        .first()
        .copied()
        .ok_or_else(|| WsFault::new(FaultKey::WsseInvalidSecurity, "KeyInfo not found"))?;

    let str_node = match doc.child_elements(key_info).as_slice() {
        [only] if doc.is_element(*only, ns::WSSE, "SecurityTokenReference") => *only,
        _ => {
            return Err(WsFault::new(
                FaultKey::WsseInvalidSecurity,
                "SecurityTokenReference not found",
            ));
        }
    };

    let content = match doc.child_elements(str_node).as_slice() {
        [only] => *only,
        _ => {
            return Err(WsFault::new(
                FaultKey::WsseInvalidSecurity,
                "SecurityTokenReference is empty",
            ));
        }
    };

    if doc.is_element(content, ns::WSSE, "Reference") {
        from_binary_token(doc, security, content)
    } else if doc.is_element(content, ns::WSSE, "KeyIdentifier") {
        from_assertion(doc, security, content)
    } else {
        Err(WsFault::new(
            FaultKey::WsseUnsupportedSecurityToken,
            "Unknown SecurityTokenReference content",
        ))
    }
}

fn from_binary_token<D: SignedDocument>(
    doc: &D,
    security: D::Node,
    reference: D::Node,
) -> Result<Signature, WsFault> {
    let unavailable = |message: &str| WsFault::new(FaultKey::WsseSecurityTokenUnavailable, message);

    let tokens = doc.children_named(security, ns::WSSE, "BinarySecurityToken");
    if tokens.is_empty() {
        return Err(unavailable("BST missing"));
    }

    let uri = doc.attribute(reference, "URI").unwrap_or_default();
    let wanted = uri.get(1..).unwrap_or_default();
    let bst = tokens
        .into_iter()
        .find(|bst| {
            doc.attribute_ns(*bst, ns::WSU, "Id")
                .is_some_and(|id| !wanted.is_empty() && id.eq_ignore_ascii_case(wanted))
        })
        .ok_or_else(|| unavailable("BST ID mismatch"))?;

    let value_types_match = match (
        doc.attribute(reference, "ValueType"),
        doc.attribute(bst, "ValueType"),
    ) {
        (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
        (None, None) => true,
        _ => false,
    };
    if !value_types_match {
        return Err(unavailable("BST value type mismatch"));
    }
    if !doc
        .attribute(bst, "EncodingType")
        .is_some_and(|encoding| encoding.eq_ignore_ascii_case(token::BASE64_ENCODING))
    {
        return Err(unavailable("Unknown BST encoding"));
    }

    let certificate = Certificate::from_base64(&doc.text(bst))
        .map_err(|err| WsFault::caused_by(FaultKey::WsseInvalidSecurityToken, err))?;
    debug!(subject = %certificate.subject_dn(), "signer resolved from binary security token");
    Ok(Signature::new(certificate, CertificateLocation::BinaryToken))
}

fn from_assertion<D: SignedDocument>(
    doc: &D,
    security: D::Node,
    key_identifier: D::Node,
) -> Result<Signature, WsFault> {
    let unavailable = |message: String| WsFault::new(FaultKey::WsseSecurityTokenUnavailable, message);
    let invalid_token = |message: &str| WsFault::new(FaultKey::WsseInvalidSecurityToken, message);

    let assertion_id = doc.text(key_identifier).trim().to_string();
    let value_type = doc.attribute(key_identifier, "ValueType");
    if assertion_id.is_empty()
        || !value_type.is_some_and(|value_type| value_type.eq_ignore_ascii_case(token::SAML_KEY_ID))
    {
        return Err(WsFault::new(
            FaultKey::WsseInvalidSecurity,
            format!(
                "assertionId = {assertion_id} valueType = {}",
                value_type.unwrap_or("null")
            ),
        ));
    }

    let assertion = doc
        .children_named(security, ns::SAML2, "Assertion")
        .first()
        .copied()
        .ok_or_else(|| unavailable("Assertion missing".to_string()))?;
    if !doc
        .attribute(assertion, "ID")
        .is_some_and(|id| id.eq_ignore_ascii_case(&assertion_id))
    {
        return Err(unavailable("Assertion ID mismatch".to_string()));
    }

    let confirmation = doc
        .children_named(assertion, ns::SAML2, "Subject")
        .first()
        .and_then(|subject| doc.children_named(*subject, ns::SAML2, "SubjectConfirmation").first().copied());
    let method = confirmation
        .and_then(|confirmation| doc.attribute(confirmation, "Method"))
        .unwrap_or_default();
    let Some(confirmation) =
        confirmation.filter(|_| method.eq_ignore_ascii_case(token::HOLDER_OF_KEY))
    else {
        return Err(unavailable(format!(
            "Invalid subject confirmation method {method}"
        )));
    };

    let data = doc
        .children_named(confirmation, ns::SAML2, "SubjectConfirmationData")
        .first()
        .copied()
        .filter(|data| {
            doc.attribute_ns(*data, ns::XSI, "type").is_some_and(|xsi_type| {
                let local = xsi_type.rsplit(':').next().unwrap_or(xsi_type);
                local == token::KEY_INFO_CONFIRMATION_TYPE
            })
        })
        .ok_or_else(|| {
            WsFault::new(
                FaultKey::WsseUnsupportedSecurityToken,
                "Unknown SubjectConfirmation type",
            )
        })?;

    let key_info = exactly_one(doc.children_named(data, ns::DSIG, "KeyInfo"))
        .ok_or_else(|| invalid_token("Assertion KeyInfo not found/valid"))?;
    let x509_data = exactly_one(doc.children_named(key_info, ns::DSIG, "X509Data"))
        .ok_or_else(|| invalid_token("X509 data not found"))?;
    let encoded = exactly_one(doc.children_named(x509_data, ns::DSIG, "X509Certificate"))
        .ok_or_else(|| invalid_token("Confirmation certificate not found"))?;

    let certificate = Certificate::from_base64(&doc.text(encoded))
        .map_err(|err| WsFault::caused_by(FaultKey::WsseInvalidSecurityToken, err))?;
    debug!(subject = %certificate.subject_dn(), "signer resolved from holder-of-key assertion");
    Ok(Signature::new(certificate, CertificateLocation::Assertion))
}

fn exactly_one<N>(mut nodes: Vec<N>) -> Option<N> {
    if nodes.len() == 1 { nodes.pop() } else { None }
}
