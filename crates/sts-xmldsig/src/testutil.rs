//! Signed SOAP envelopes for tests.

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sts_crypto::algorithm::{digest_uris, signature_uris};
use sts_crypto::{DigestAlgorithm, hash};

use crate::c14n::parse_prefix_list;
use crate::dom::Document;
use crate::types::{c14n, ns, token};

const SIGNATURE_SLOT: &str = "<!--signature-->";
const EMPTY_VALUE: &str = "<ds:SignatureValue></ds:SignatureValue>";

/// How the signature's key info names the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInfoKind {
    BinaryToken,
    HolderOfKey,
}

/// Builds a SOAP 1.1 issue request signed with a fresh P-256 key.
pub struct EnvelopeBuilder {
    key_pair: EcdsaKeyPair,
    certificate_der: Vec<u8>,
    references: Vec<String>,
    canonicalization: String,
    transforms: Vec<String>,
    transform_prefixes: Option<String>,
    digest_method: String,
    key_info: KeyInfoKind,
    timestamp: bool,
    body_prefix: String,
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        let generated =
            rcgen::generate_simple_self_signed(vec!["signer.example.com".to_string()]).unwrap();
        let key_pair = EcdsaKeyPair::from_pkcs8(
            &ECDSA_P256_SHA256_FIXED_SIGNING,
            &generated.serialize_private_key_der(),
        )
        .unwrap();
        Self {
            key_pair,
            certificate_der: generated.serialize_der().unwrap(),
            references: vec!["#TS-1".to_string(), "#Body-1".to_string()],
            canonicalization: c14n::EXCLUSIVE.to_string(),
            transforms: vec![c14n::EXCLUSIVE.to_string()],
            transform_prefixes: None,
            digest_method: digest_uris::SHA256.to_string(),
            key_info: KeyInfoKind::BinaryToken,
            timestamp: true,
            body_prefix: String::new(),
        }
    }

    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    pub fn references(mut self, uris: &[&str]) -> Self {
        self.references = uris.iter().map(|uri| (*uri).to_string()).collect();
        self
    }

    pub fn canonicalization(mut self, uri: &str) -> Self {
        self.canonicalization = uri.to_string();
        self
    }

    pub fn transforms(mut self, uris: &[&str]) -> Self {
        self.transforms = uris.iter().map(|uri| (*uri).to_string()).collect();
        self
    }

    pub fn transform_prefixes(mut self, prefixes: &str) -> Self {
        self.transform_prefixes = Some(prefixes.to_string());
        self
    }

    pub fn digest_method(mut self, uri: &str) -> Self {
        self.digest_method = uri.to_string();
        self
    }

    pub fn key_info(mut self, kind: KeyInfoKind) -> Self {
        self.key_info = kind;
        self
    }

    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = false;
        self
    }

    pub fn body_prefix(mut self, text: &str) -> Self {
        self.body_prefix = text.to_string();
        self
    }

    pub fn build(&self) -> String {
        self.sign(false)
    }

    pub fn build_with_signature_tampered(&self) -> String {
        self.sign(true)
    }

    fn sign(&self, tamper: bool) -> String {
        let unsigned = self.envelope();
        let doc = Document::parse(&unsigned.replace(SIGNATURE_SLOT, "")).unwrap();

        let signature = format!(
            r#"<ds:Signature><ds:SignedInfo><ds:CanonicalizationMethod Algorithm="{c14n}"/><ds:SignatureMethod Algorithm="{method}"/>{references}</ds:SignedInfo>{EMPTY_VALUE}<ds:KeyInfo>{key_info}</ds:KeyInfo></ds:Signature>"#,
            c14n = self.canonicalization,
            method = signature_uris::ECDSA_SHA256,
            references = self.reference_elements(&doc),
            key_info = self.key_info_element(),
        );
        let with_slot = unsigned.replace(SIGNATURE_SLOT, &signature);

        let doc = Document::parse(&with_slot).unwrap();
        let signed_info = doc.elements_by_name(ns::DSIG, "SignedInfo")[0];
        let canonical = crate::c14n::canonicalize(&doc, signed_info, &[]).unwrap();
        let mut value = self
            .key_pair
            .sign(&SystemRandom::new(), &canonical)
            .unwrap()
            .as_ref()
            .to_vec();
        if tamper {
            value[0] ^= 0x01;
        }

        with_slot.replace(
            EMPTY_VALUE,
            &format!(
                "<ds:SignatureValue>{}</ds:SignatureValue>",
                STANDARD.encode(value)
            ),
        )
    }

    fn reference_elements(&self, doc: &Document) -> String {
        let prefixes = self
            .transform_prefixes
            .as_deref()
            .map(parse_prefix_list)
            .unwrap_or_default();
        let digest = DigestAlgorithm::from_uri(&self.digest_method).unwrap();

        self.references
            .iter()
            .map(|uri| {
                let value = uri
                    .strip_prefix('#')
                    .and_then(|id| doc.element_by_id(id))
                    .map_or_else(
                        || STANDARD.encode([0_u8; 32]),
                        |target| {
                            let canonical =
                                crate::c14n::canonicalize(doc, target, &prefixes).unwrap();
                            STANDARD.encode(hash(digest, &canonical))
                        },
                    );
                let transforms: String = self
                    .transforms
                    .iter()
                    .map(|algorithm| match &self.transform_prefixes {
                        Some(list) => format!(
                            r#"<ds:Transform Algorithm="{algorithm}"><ec:InclusiveNamespaces xmlns:ec="{}" PrefixList="{list}"/></ds:Transform>"#,
                            ns::EXC_C14N
                        ),
                        None => format!(r#"<ds:Transform Algorithm="{algorithm}"/>"#),
                    })
                    .collect();
                format!(
                    r#"<ds:Reference URI="{uri}"><ds:Transforms>{transforms}</ds:Transforms><ds:DigestMethod Algorithm="{}"/><ds:DigestValue>{value}</ds:DigestValue></ds:Reference>"#,
                    self.digest_method
                )
            })
            .collect()
    }

    fn key_info_element(&self) -> String {
        match self.key_info {
            KeyInfoKind::BinaryToken => format!(
                r##"<wsse:SecurityTokenReference><wsse:Reference URI="#BST-1" ValueType="{}"/></wsse:SecurityTokenReference>"##,
                token::X509_V3
            ),
            KeyInfoKind::HolderOfKey => format!(
                r#"<wsse:SecurityTokenReference><wsse:KeyIdentifier ValueType="{}">_assertion-1</wsse:KeyIdentifier></wsse:SecurityTokenReference>"#,
                token::SAML_KEY_ID
            ),
        }
    }

    fn token_element(&self) -> String {
        let certificate = STANDARD.encode(&self.certificate_der);
        match self.key_info {
            KeyInfoKind::BinaryToken => format!(
                r#"<wsse:BinarySecurityToken wsu:Id="BST-1" ValueType="{}" EncodingType="{}">{certificate}</wsse:BinarySecurityToken>"#,
                token::X509_V3,
                token::BASE64_ENCODING
            ),
            KeyInfoKind::HolderOfKey => format!(
                r#"<saml2:Assertion xmlns:saml2="{saml}" xmlns:xsi="{xsi}" ID="_assertion-1"><saml2:Subject><saml2:NameID>user@example.com</saml2:NameID><saml2:SubjectConfirmation Method="{hok}"><saml2:SubjectConfirmationData xsi:type="saml2:KeyInfoConfirmationDataType"><ds:KeyInfo><ds:X509Data><ds:X509Certificate>{certificate}</ds:X509Certificate></ds:X509Data></ds:KeyInfo></saml2:SubjectConfirmationData></saml2:SubjectConfirmation></saml2:Subject></saml2:Assertion>"#,
                saml = ns::SAML2,
                xsi = ns::XSI,
                hok = token::HOLDER_OF_KEY
            ),
        }
    }

    fn envelope(&self) -> String {
        let timestamp = if self.timestamp {
            r#"<wsu:Timestamp wsu:Id="TS-1"><wsu:Created>2024-01-01T00:00:00Z</wsu:Created><wsu:Expires>2024-01-01T00:05:00Z</wsu:Expires></wsu:Timestamp>"#
        } else {
            ""
        };
        format!(
            r#"<soap:Envelope xmlns:soap="{soap}" xmlns:wsse="{wsse}" xmlns:wsu="{wsu}" xmlns:ds="{ds}">
  <soap:Header>
    <wsse:Security>{token}{timestamp}{SIGNATURE_SLOT}</wsse:Security>
  </soap:Header>
  <soap:Body wsu:Id="Body-1">{prefix}<wst:RequestSecurityToken xmlns:wst="{wst}" wsu:Id="RST-1"><wst:RequestType>{wst}/Issue</wst:RequestType></wst:RequestSecurityToken></soap:Body>
</soap:Envelope>"#,
            soap = ns::SOAP11,
            wsse = ns::WSSE,
            wsu = ns::WSU,
            ds = ns::DSIG,
            wst = ns::WST,
            token = self.token_element(),
            prefix = self.body_prefix,
        )
    }
}
