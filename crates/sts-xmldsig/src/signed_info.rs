//! `ds:SignedInfo` model.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::c14n::parse_prefix_list;
use crate::document::SignedDocument;
use crate::error::{XmlError, XmlResult};
use crate::types::ns;

/// A `ds:Transform` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    /// Algorithm URI.
    pub algorithm: String,
    /// `InclusiveNamespaces` prefix list of an exclusive c14n transform.
    pub inclusive_prefixes: Vec<String>,
}

/// A `ds:Reference` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The `URI` attribute, empty when absent.
    pub uri: String,
    /// Transforms in declaration order.
    pub transforms: Vec<Transform>,
    /// Digest algorithm URI.
    pub digest_method: String,
    /// Decoded digest value.
    pub digest_value: Vec<u8>,
}

impl Reference {
    /// Fragment identifier of a same-document reference (`#id`).
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.uri
            .strip_prefix('#')
            .filter(|id| !id.is_empty() && !id.starts_with("xpointer("))
    }
}

/// A parsed `ds:Signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInfo<N> {
    /// The `ds:SignedInfo` element.
    pub node: N,
    /// Canonicalization method URI.
    pub canonicalization: String,
    /// Prefix list of the canonicalization method.
    pub inclusive_prefixes: Vec<String>,
    /// Signature method URI.
    pub signature_method: String,
    /// References in declaration order.
    pub references: Vec<Reference>,
    /// Decoded `ds:SignatureValue`.
    pub signature_value: Vec<u8>,
}

impl<N: Copy + Eq + std::fmt::Debug> SignedInfo<N> {
    /// Reads the `SignedInfo` and `SignatureValue` of a `ds:Signature` element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::Malformed`] when a required part is missing and
    /// [`XmlError::Base64`] when a value is not valid base64.
    pub fn parse<D>(doc: &D, signature: N) -> XmlResult<Self>
    where
        D: SignedDocument<Node = N>,
    {
        let signed_info = single(doc, signature, "SignedInfo")?;
        let c14n_method = single(doc, signed_info, "CanonicalizationMethod")?;
        let canonicalization = algorithm(doc, c14n_method)?;
        let inclusive_prefixes = prefix_list(doc, c14n_method);

        let signature_method = algorithm(doc, single(doc, signed_info, "SignatureMethod")?)?;

        let mut references = Vec::new();
        for reference in doc.children_named(signed_info, ns::DSIG, "Reference") {
            references.push(parse_reference(doc, reference)?);
        }

        let value_node = single(doc, signature, "SignatureValue")?;
        let signature_value = decode(&doc.text(value_node))?;

        Ok(Self {
            node: signed_info,
            canonicalization,
            inclusive_prefixes,
            signature_method,
            references,
            signature_value,
        })
    }
}

fn parse_reference<D: SignedDocument>(doc: &D, reference: D::Node) -> XmlResult<Reference> {
    let uri = doc.attribute(reference, "URI").unwrap_or_default().to_string();

    let mut transforms = Vec::new();
    if let Some(list) = doc.children_named(reference, ns::DSIG, "Transforms").first() {
        for transform in doc.children_named(*list, ns::DSIG, "Transform") {
            transforms.push(Transform {
                algorithm: algorithm(doc, transform)?,
                inclusive_prefixes: prefix_list(doc, transform),
            });
        }
    }

    let digest_method = algorithm(doc, single(doc, reference, "DigestMethod")?)?;
    let digest_value = decode(&doc.text(single(doc, reference, "DigestValue")?))?;

    Ok(Reference {
        uri,
        transforms,
        digest_method,
        digest_value,
    })
}

fn single<D: SignedDocument>(doc: &D, parent: D::Node, local_name: &str) -> XmlResult<D::Node> {
    let mut found = doc.children_named(parent, ns::DSIG, local_name);
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(XmlError::Malformed(format!("ds:{local_name} not found"))),
        _ => Err(XmlError::Malformed(format!("more than one ds:{local_name}"))),
    }
}

fn algorithm<D: SignedDocument>(doc: &D, node: D::Node) -> XmlResult<String> {
    doc.attribute(node, "Algorithm")
        .map(str::to_string)
        .ok_or_else(|| {
            XmlError::Malformed(format!("ds:{} without Algorithm", doc.local_name(node)))
        })
}

fn prefix_list<D: SignedDocument>(doc: &D, node: D::Node) -> Vec<String> {
    doc.children_named(node, ns::EXC_C14N, "InclusiveNamespaces")
        .first()
        .and_then(|inclusive| doc.attribute(*inclusive, "PrefixList"))
        .map(parse_prefix_list)
        .unwrap_or_default()
}

fn decode(text: &str) -> XmlResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    const SIGNATURE: &str = r##"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#" xmlns:ec="http://www.w3.org/2001/10/xml-exc-c14n#">
  <ds:SignedInfo>
    <ds:CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#">
      <ec:InclusiveNamespaces PrefixList="wsse soap"/>
    </ds:CanonicalizationMethod>
    <ds:SignatureMethod Algorithm="http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256"/>
    <ds:Reference URI="#Body-1">
      <ds:Transforms>
        <ds:Transform Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"><ec:InclusiveNamespaces PrefixList="#default"/></ds:Transform>
      </ds:Transforms>
      <ds:DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>
      <ds:DigestValue>AQID</ds:DigestValue>
    </ds:Reference>
    <ds:Reference URI="">
      <ds:DigestMethod Algorithm="http://www.w3.org/2001/04/xmlenc#sha256"/>
      <ds:DigestValue>BAUG</ds:DigestValue>
    </ds:Reference>
  </ds:SignedInfo>
  <ds:SignatureValue>
    AAEC
    AwQF
  </ds:SignatureValue>
</ds:Signature>"##;

    #[test]
    fn parses_signed_info() {
        let doc = Document::parse(SIGNATURE).unwrap();
        let info = SignedInfo::parse(&doc, doc.root()).unwrap();

        assert_eq!(info.canonicalization, "http://www.w3.org/2001/10/xml-exc-c14n#");
        assert_eq!(info.inclusive_prefixes, vec!["wsse", "soap"]);
        assert_eq!(
            info.signature_method,
            "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256"
        );
        assert_eq!(info.signature_value, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(info.references.len(), 2);

        let body = &info.references[0];
        assert_eq!(body.fragment(), Some("Body-1"));
        assert_eq!(body.transforms.len(), 1);
        assert_eq!(body.transforms[0].inclusive_prefixes, vec!["#default"]);
        assert_eq!(body.digest_value, vec![1, 2, 3]);

        assert_eq!(info.references[1].fragment(), None);
        assert!(info.references[1].transforms.is_empty());
    }

    #[test]
    fn missing_parts_are_malformed() {
        let xml = SIGNATURE.replace("<ds:SignatureMethod Algorithm=\"http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256\"/>", "");
        let doc = Document::parse(&xml).unwrap();
        let err = SignedInfo::parse(&doc, doc.root()).unwrap_err();
        assert!(matches!(err, XmlError::Malformed(msg) if msg.contains("SignatureMethod")));
    }

    #[test]
    fn bad_base64_is_reported() {
        let xml = SIGNATURE.replace("AQID", "!!!");
        let doc = Document::parse(&xml).unwrap();
        assert!(matches!(
            SignedInfo::parse(&doc, doc.root()),
            Err(XmlError::Base64(_))
        ));
    }

    #[test]
    fn fragment_rejects_external_and_xpointer_uris() {
        let reference = |uri: &str| Reference {
            uri: uri.to_string(),
            transforms: Vec::new(),
            digest_method: String::new(),
            digest_value: Vec::new(),
        };
        assert_eq!(reference("#ts").fragment(), Some("ts"));
        assert_eq!(reference("http://evil/doc#ts").fragment(), None);
        assert_eq!(reference("#xpointer(/)").fragment(), None);
        assert_eq!(reference("#").fragment(), None);
    }
}
