//! Namespaces and identifiers used by WS-Security messages.

/// XML namespace URIs.
pub mod ns {
    /// SOAP 1.1 envelope.
    pub const SOAP11: &str = "http://schemas.xmlsoap.org/soap/envelope/";
    /// WS-Security secext 1.0.
    pub const WSSE: &str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
    /// WS-Security utility 1.0.
    pub const WSU: &str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
    /// WS-Trust 1.3.
    pub const WST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";
    /// XML Digital Signature.
    pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
    /// Exclusive canonicalization (also the `InclusiveNamespaces` namespace).
    pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
    /// SAML 2.0 assertion.
    pub const SAML2: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
    /// XML Schema instance.
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    /// The reserved `xml` prefix.
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Canonicalization algorithm URIs.
pub mod c14n {
    /// Exclusive C14N without comments, the only accepted method.
    pub const EXCLUSIVE: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
    /// Exclusive C14N with comments.
    pub const EXCLUSIVE_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";
    /// Inclusive C14N 1.0.
    pub const INCLUSIVE: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
}

/// Token profile identifiers.
pub mod token {
    /// Base64 encoding type of a binary security token.
    pub const BASE64_ENCODING: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";
    /// X.509 v3 binary security token value type.
    pub const X509_V3: &str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-x509-token-profile-1.0#X509v3";
    /// Key identifier value type referencing a SAML 2.0 assertion.
    pub const SAML_KEY_ID: &str =
        "http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLID";
    /// Holder-of-key subject confirmation method.
    pub const HOLDER_OF_KEY: &str = "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key";
    /// Bearer subject confirmation method.
    pub const BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";
    /// `xsi:type` local name of key-info confirmation data.
    pub const KEY_INFO_CONFIRMATION_TYPE: &str = "KeyInfoConfirmationDataType";
}
