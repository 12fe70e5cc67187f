//! XML processing errors.

use thiserror::Error;

/// Result type for XML operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors raised while parsing, navigating or canonicalizing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// Document type declarations are refused.
    #[error("DOCTYPE declarations are not allowed")]
    DoctypeNotAllowed,

    /// The document has no document element.
    #[error("document has no root element")]
    NoRoot,

    /// Two elements declare the same ID.
    #[error("duplicate element ID: {0}")]
    DuplicateId(String),

    /// A prefix is used without a namespace declaration in scope.
    #[error("unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    /// An XML-DSig structure is missing a required part.
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// Base64 content could not be decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for XmlError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Parse(err.to_string())
    }
}
