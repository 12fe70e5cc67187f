//! The per-call request handed to authenticators.
//!
//! Built once by the WS-Security header processor and read-only afterwards.

use chrono::{DateTime, Utc};
use sts_crypto::Certificate;
use sts_xmldsig::Signature;

use crate::token::SamlToken;

/// WS-Trust request type URIs.
pub mod request_type {
    /// Issue.
    pub const ISSUE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue";
    /// Renew.
    pub const RENEW: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Renew";
    /// Validate.
    pub const VALIDATE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Validate";
}

/// A `wsse:UsernameToken` child value; `value` is `None` for an empty element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenValue {
    /// Element text.
    pub value: Option<String>,
}

impl TokenValue {
    /// An element with text.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    /// An element without text.
    #[must_use]
    pub const fn empty() -> Self {
        Self { value: None }
    }
}

/// `wsse:UsernameToken`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsernameToken {
    /// `wsse:Username`.
    pub username: Option<TokenValue>,
    /// `wsse:Password`.
    pub password: Option<TokenValue>,
    /// `wsse:Passcode`, a SecurID token code.
    pub passcode: Option<TokenValue>,
}

impl UsernameToken {
    /// A username token with a password.
    pub fn with_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(TokenValue::new(username)),
            password: Some(TokenValue::new(password)),
            passcode: None,
        }
    }

    /// A username token with a passcode.
    pub fn with_passcode(username: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            username: Some(TokenValue::new(username)),
            password: None,
            passcode: Some(TokenValue::new(passcode)),
        }
    }
}

/// `wsse:BinarySecurityToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinarySecurityToken {
    /// `wsu:Id`.
    pub id: Option<String>,
    /// Value type URI.
    pub value_type: String,
    /// Encoding type URI.
    pub encoding_type: String,
    /// Encoded token.
    pub value: String,
}

/// A client certificate token carrying its own signature over `signature_info`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserCertificateToken {
    /// Certificate chain, leaf first.
    pub certificates: Vec<Certificate>,
    /// The signed string.
    pub signature_info: String,
    /// XML-DSig signature method URI.
    pub signature_algorithm: Option<String>,
    /// Raw signature value.
    pub signature_value: Vec<u8>,
}

/// `wsu:Timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// `wsu:Created`.
    pub created: DateTime<Utc>,
    /// `wsu:Expires`.
    pub expires: Option<DateTime<Utc>>,
}

/// The `wsse:Security` header content the authenticators look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityHeader {
    /// Username token.
    pub username_token: Option<UsernameToken>,
    /// Binary security token.
    pub binary_security_token: Option<BinarySecurityToken>,
    /// Client certificate token.
    pub user_certificate_token: Option<UserCertificateToken>,
    /// Request timestamp.
    pub timestamp: Option<Timestamp>,
}

/// `wst:BinaryExchange`, one leg of a negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExchange {
    /// Value type URI.
    pub value_type: String,
    /// Encoding type URI.
    pub encoding_type: String,
    /// Encoded leg.
    pub value: String,
}

/// Requested token lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    /// Start of validity.
    pub created: Option<DateTime<Utc>>,
    /// End of validity.
    pub expires: Option<DateTime<Utc>>,
}

/// `wst:RequestSecurityToken`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSecurityToken {
    /// Request type URI.
    pub request_type: String,
    /// `Context` attribute, the negotiation correlation id.
    pub context: Option<String>,
    /// Negotiation leg.
    pub binary_exchange: Option<BinaryExchange>,
    /// Requested lifetime.
    pub lifetime: Option<Lifetime>,
    /// Principal the issued token is delegated to.
    pub delegate_to: Option<String>,
    /// Whether the issued token may be delegated further.
    pub delegatable: bool,
    /// Token to renew.
    pub renew_target: Option<SamlToken>,
    /// Token to validate.
    pub validate_target: Option<SamlToken>,
}

impl RequestSecurityToken {
    /// A request of the given type.
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            ..Self::default()
        }
    }

    /// Sets the negotiation context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Everything the authentication pipeline sees of one inbound call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// Security header content.
    pub header: SecurityHeader,
    /// Request body.
    pub rst: RequestSecurityToken,
    /// Validated request signature.
    pub signature: Option<Signature>,
    /// SAML assertion presented in the header.
    pub saml_token: Option<SamlToken>,
    /// `wst:ActAs` assertion.
    pub act_as_token: Option<SamlToken>,
}

impl Request {
    /// A request from header and body.
    #[must_use]
    pub fn new(header: SecurityHeader, rst: RequestSecurityToken) -> Self {
        Self {
            header,
            rst,
            ..Self::default()
        }
    }

    /// Attaches the validated signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Attaches a SAML assertion.
    #[must_use]
    pub fn with_saml_token(mut self, token: SamlToken) -> Self {
        self.saml_token = Some(token);
        self
    }

    /// Attaches an act-as assertion.
    #[must_use]
    pub fn with_act_as_token(mut self, token: SamlToken) -> Self {
        self.act_as_token = Some(token);
        self
    }
}
