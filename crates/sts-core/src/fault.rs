//! Standardized WS-Security and WS-Trust fault codes.
//!
//! Every fault the service can raise is identified by a [`FaultKey`]. The
//! key resolves, through the process-wide [`FaultTable`], to a qualified
//! SOAP fault code and a canned human-readable description. The table is
//! built once on first access and is never mutated afterwards.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Namespace of WS-Security 1.0 faults.
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// Namespace of WS-Trust 1.3 faults.
pub const WST_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";

/// Boxed error used as a fault cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The two namespaces fault codes are partitioned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultNamespace {
    /// WS-Security (`wsse`).
    Wsse,
    /// WS-Trust (`wst`).
    Wst,
}

impl FaultNamespace {
    /// Returns the namespace URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Wsse => WSSE_NS,
            Self::Wst => WST_NS,
        }
    }

    /// Returns the conventional prefix used when rendering fault codes.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Wsse => "wsse",
            Self::Wst => "wst",
        }
    }
}

/// Enumerated fault keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKey {
    /// `wsse:FailedAuthentication`
    WsseFailedAuthentication,
    /// `wsse:FailedCheck`
    WsseFailedCheck,
    /// `wsse:InvalidSecurity`
    WsseInvalidSecurity,
    /// `wsse:InvalidSecurityToken`
    WsseInvalidSecurityToken,
    /// `wsse:MessageExpired`
    WsseMessageExpired,
    /// `wsse:SecurityTokenUnavailable`
    WsseSecurityTokenUnavailable,
    /// `wsse:UnsupportedAlgorithm`
    WsseUnsupportedAlgorithm,
    /// `wsse:UnsupportedSecurityToken`
    WsseUnsupportedSecurityToken,
    /// `wst:InvalidRequest`
    WstInvalidRequest,
    /// `wst:RequestFailed`
    WstRequestFailed,
    /// `wst:FailedAuthentication`
    WstAuthenticationFailed,
    /// `wst:InvalidTimeRange`
    WstInvalidTimeRange,
    /// `wst:UnableToRenew`
    WstUnableToRenew,
}

impl FaultKey {
    /// All keys, in table order.
    pub const ALL: [Self; 13] = [
        Self::WsseFailedAuthentication,
        Self::WsseFailedCheck,
        Self::WsseInvalidSecurity,
        Self::WsseInvalidSecurityToken,
        Self::WsseMessageExpired,
        Self::WsseSecurityTokenUnavailable,
        Self::WsseUnsupportedAlgorithm,
        Self::WsseUnsupportedSecurityToken,
        Self::WstInvalidRequest,
        Self::WstRequestFailed,
        Self::WstAuthenticationFailed,
        Self::WstInvalidTimeRange,
        Self::WstUnableToRenew,
    ];

    /// Returns the standard code descriptor for this key.
    #[must_use]
    pub fn code(self) -> &'static FaultCode {
        FaultTable::standard().get(self)
    }
}

impl fmt::Display for FaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        write!(f, "{}:{}", code.namespace.prefix(), code.local_name)
    }
}

/// Qualified fault code and its canned description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultCode {
    /// Namespace the local name belongs to.
    pub namespace: FaultNamespace,
    /// Local part of the qualified name.
    pub local_name: &'static str,
    /// Default description used when no cause message is available.
    pub description: &'static str,
}

impl FaultCode {
    const fn new(
        namespace: FaultNamespace,
        local_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            namespace,
            local_name,
            description,
        }
    }

    /// Returns the prefixed form, e.g. `wsse:FailedCheck`.
    #[must_use]
    pub fn prefixed_name(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.local_name)
    }
}

/// Immutable key to code table.
#[derive(Debug)]
pub struct FaultTable {
    codes: HashMap<FaultKey, FaultCode>,
}

static STANDARD_TABLE: LazyLock<FaultTable> = LazyLock::new(FaultTable::build);

impl FaultTable {
    /// Returns the process-wide table.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_TABLE
    }

    fn build() -> Self {
        use FaultNamespace::{Wsse, Wst};

        let entries = [
            (
                FaultKey::WsseFailedAuthentication,
                FaultCode::new(
                    Wsse,
                    "FailedAuthentication",
                    "The security token could not be authenticated or authorized",
                ),
            ),
            (
                FaultKey::WsseFailedCheck,
                FaultCode::new(Wsse, "FailedCheck", "The signature or decryption was invalid"),
            ),
            (
                FaultKey::WsseInvalidSecurity,
                FaultCode::new(
                    Wsse,
                    "InvalidSecurity",
                    "An error was discovered processing the <wsse:Security> header",
                ),
            ),
            (
                FaultKey::WsseInvalidSecurityToken,
                FaultCode::new(
                    Wsse,
                    "InvalidSecurityToken",
                    "An invalid security token was provided",
                ),
            ),
            (
                FaultKey::WsseMessageExpired,
                FaultCode::new(Wsse, "MessageExpired", "The message has expired"),
            ),
            (
                FaultKey::WsseSecurityTokenUnavailable,
                FaultCode::new(
                    Wsse,
                    "SecurityTokenUnavailable",
                    "Referenced security token could not be retrieved",
                ),
            ),
            (
                FaultKey::WsseUnsupportedAlgorithm,
                FaultCode::new(
                    Wsse,
                    "UnsupportedAlgorithm",
                    "An unsupported signature or encryption algorithm was used",
                ),
            ),
            (
                FaultKey::WsseUnsupportedSecurityToken,
                FaultCode::new(
                    Wsse,
                    "UnsupportedSecurityToken",
                    "An unsupported token was provided",
                ),
            ),
            (
                FaultKey::WstInvalidRequest,
                FaultCode::new(Wst, "InvalidRequest", "The request was invalid or malformed"),
            ),
            (
                FaultKey::WstRequestFailed,
                FaultCode::new(Wst, "RequestFailed", "The specified request failed"),
            ),
            (
                FaultKey::WstAuthenticationFailed,
                FaultCode::new(Wst, "FailedAuthentication", "Authentication failed"),
            ),
            (
                FaultKey::WstInvalidTimeRange,
                FaultCode::new(
                    Wst,
                    "InvalidTimeRange",
                    "The requested time range is invalid or unsupported",
                ),
            ),
            (
                FaultKey::WstUnableToRenew,
                FaultCode::new(Wst, "UnableToRenew", "The requested renewal failed"),
            ),
        ];

        Self {
            codes: entries.into_iter().collect(),
        }
    }

    /// Looks up the descriptor for a key.
    ///
    /// Every [`FaultKey`] has an entry; the fallback only exists to keep the
    /// lookup total.
    #[must_use]
    pub fn get(&self, key: FaultKey) -> &FaultCode {
        static FALLBACK: FaultCode = FaultCode::new(
            FaultNamespace::Wst,
            "RequestFailed",
            "The specified request failed",
        );
        self.codes.get(&key).unwrap_or(&FALLBACK)
    }

    /// Iterates all entries in [`FaultKey::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (FaultKey, &FaultCode)> + '_ {
        FaultKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }
}

/// A typed fault raised by the signature validator and the STS operations.
///
/// Carries the fault key, an optional message for this level and an
/// optional cause. The cause chain feeds the fault description.
#[derive(Debug)]
pub struct WsFault {
    key: FaultKey,
    message: Option<String>,
    source: Option<BoxError>,
}

impl WsFault {
    /// Creates a fault with a message and no cause.
    pub fn new(key: FaultKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Creates a fault that only wraps a cause.
    pub fn caused_by(key: FaultKey, source: impl Into<BoxError>) -> Self {
        Self {
            key,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Creates a fault with neither message nor cause.
    #[must_use]
    pub const fn bare(key: FaultKey) -> Self {
        Self {
            key,
            message: None,
            source: None,
        }
    }

    /// Attaches a cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the fault key.
    #[must_use]
    pub const fn key(&self) -> FaultKey {
        self.key
    }

    /// Returns the message of this level, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for WsFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.source) {
            (Some(message), _) => write!(f, "{}: {message}", self.key),
            (None, Some(source)) => write!(f, "{}: {source}", self.key),
            (None, None) => write!(f, "{}: {}", self.key, self.key.code().description),
        }
    }
}

impl StdError for WsFault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}
