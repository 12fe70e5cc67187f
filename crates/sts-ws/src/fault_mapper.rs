//! Translation of operation errors into SOAP faults.
//!
//! This is the only place where internal error types meet wire fault codes.
//! Each error selects a [`FaultKey`]; the fault description is built from
//! the error's cause chain, innermost message first.

use std::error::Error as StdError;

use quick_xml::Writer;
use quick_xml::events::BytesText;
use sts_auth::AuthError;
use sts_core::{FaultCode, FaultKey, FaultTable, WsFault};
use sts_xmldsig::types::ns;
use tracing::{error, info, warn};

use crate::error::StsError;

/// Separator between cause messages in a fault description.
pub const DESCRIPTION_SEPARATOR: &str = "; ";

/// What the transport sends back for a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultResponse {
    /// A SOAP fault.
    Soap(SoapFault),
    /// The tenant does not exist.
    NotFound {
        /// Requested tenant.
        tenant: String,
    },
}

impl FaultResponse {
    /// HTTP status code of the response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Soap(_) => 500,
            Self::NotFound { .. } => 404,
        }
    }

    /// Returns the SOAP fault, if any.
    #[must_use]
    pub const fn as_soap(&self) -> Option<&SoapFault> {
        match self {
            Self::Soap(fault) => Some(fault),
            Self::NotFound { .. } => None,
        }
    }
}

/// A SOAP 1.1 fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    key: FaultKey,
    code: FaultCode,
    description: String,
}

impl SoapFault {
    /// The fault key.
    #[must_use]
    pub const fn key(&self) -> FaultKey {
        self.key
    }

    /// The qualified fault code.
    #[must_use]
    pub const fn code(&self) -> &FaultCode {
        &self.code
    }

    /// The `faultstring`.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Renders the fault as a SOAP 1.1 envelope.
    pub fn to_xml(&self) -> quick_xml::Result<String> {
        let fault_ns = format!("xmlns:{}", self.code.namespace.prefix());
        let fault_code = self.code.prefixed_name();

        let mut writer = Writer::new(Vec::new());
        writer
            .create_element("S:Envelope")
            .with_attribute(("xmlns:S", ns::SOAP11))
            .write_inner_content(|writer| {
                writer.create_element("S:Body").write_inner_content(|writer| {
                    writer
                        .create_element("S:Fault")
                        .with_attribute((fault_ns.as_str(), self.code.namespace.uri()))
                        .write_inner_content(|writer| {
                            writer
                                .create_element("faultcode")
                                .write_text_content(BytesText::new(&fault_code))?;
                            writer
                                .create_element("faultstring")
                                .write_text_content(BytesText::new(&self.description))?;
                            Ok::<(), quick_xml::Error>(())
                        })?;
                    Ok::<(), quick_xml::Error>(())
                })?;
                Ok::<(), quick_xml::Error>(())
            })?;

        String::from_utf8(writer.into_inner())
            .map_err(|err| quick_xml::Error::NonDecodable(Some(err.utf8_error())))
    }
}

/// Maps [`StsError`] values to fault responses.
#[derive(Debug, Clone, Copy)]
pub struct FaultMapper {
    table: &'static FaultTable,
}

impl Default for FaultMapper {
    fn default() -> Self {
        Self::new(FaultTable::standard())
    }
}

impl FaultMapper {
    /// Creates a mapper over a fault table.
    #[must_use]
    pub const fn new(table: &'static FaultTable) -> Self {
        Self { table }
    }

    /// Maps an operation error.
    #[must_use]
    pub fn map(&self, err: &StsError) -> FaultResponse {
        let (key, description) = match err {
            StsError::NoSuchIdp { tenant } => {
                info!(%tenant, "request for unknown tenant");
                return FaultResponse::NotFound {
                    tenant: tenant.clone(),
                };
            }
            StsError::Auth(auth) => self.map_auth(auth),
            StsError::Fault(fault) => (fault.key(), self.describe(fault.key(), fault)),
            StsError::InvalidRequest { .. } => self.keyed(FaultKey::WstInvalidRequest, err),
            StsError::RequestExpired(_) => self.keyed(FaultKey::WsseMessageExpired, err),
            StsError::InvalidSecurity { .. } | StsError::InvalidSecurityHeader(_) => {
                self.keyed(FaultKey::WsseInvalidSecurity, err)
            }
            StsError::InvalidTimeRange { .. } => self.keyed(FaultKey::WstInvalidTimeRange, err),
            StsError::UnableToRenew { .. } => self.keyed(FaultKey::WstUnableToRenew, err),
            StsError::InvalidSignature { .. } => self.keyed(FaultKey::WsseFailedCheck, err),
            StsError::RequestFailed { .. } => self.keyed(FaultKey::WstRequestFailed, err),
        };

        FaultResponse::Soap(self.soap(key, description))
    }

    /// Maps a fault raised outside an operation, e.g. by the signature
    /// validator before the request reaches the STS.
    #[must_use]
    pub fn map_fault(&self, fault: &WsFault) -> SoapFault {
        self.soap(fault.key(), self.describe(fault.key(), fault))
    }

    fn soap(&self, key: FaultKey, description: String) -> SoapFault {
        if key == FaultKey::WstRequestFailed {
            error!(fault = %key, %description, "request failed");
        } else {
            warn!(fault = %key, %description, "request rejected");
        }

        SoapFault {
            key,
            code: self.table.get(key).clone(),
            description,
        }
    }

    fn map_auth(&self, err: &AuthError) -> (FaultKey, String) {
        match err {
            // The cause may name accounts or directory details; only the
            // public message leaves the service.
            AuthError::InvalidCredentials { message, .. } => {
                let key = FaultKey::WstAuthenticationFailed;
                let description = if message.is_empty() {
                    self.fallback(key)
                } else {
                    message.clone()
                };
                (key, description)
            }
            AuthError::UnsupportedSecurityToken { .. } => {
                self.keyed(FaultKey::WsseUnsupportedSecurityToken, err)
            }
            AuthError::InvalidSignature { .. } => self.keyed(FaultKey::WsseFailedCheck, err),
            AuthError::RequestFailed { .. } => self.keyed(FaultKey::WstRequestFailed, err),
        }
    }

    fn keyed(&self, key: FaultKey, err: &(dyn StdError + 'static)) -> (FaultKey, String) {
        (key, self.describe(key, err))
    }

    /// Builds a fault description from an error and its causes.
    ///
    /// Messages are taken innermost first. A level is skipped when its
    /// message is empty, repeats its own cause, or was already taken. With
    /// nothing left the key's canned description is used.
    #[must_use]
    pub fn describe(&self, key: FaultKey, err: &(dyn StdError + 'static)) -> String {
        let mut levels = Vec::new();
        let mut current = Some(err);
        while let Some(level) = current {
            levels.push(level);
            current = level.source();
        }

        let mut parts: Vec<String> = Vec::new();
        for level in levels.into_iter().rev() {
            let Some(message) = level_message(level) else {
                continue;
            };
            if message.is_empty() {
                continue;
            }
            if level
                .source()
                .is_some_and(|cause| cause.to_string() == message)
            {
                continue;
            }
            if parts.contains(&message) {
                continue;
            }
            parts.push(message);
        }

        if parts.is_empty() {
            self.fallback(key)
        } else {
            parts.join(DESCRIPTION_SEPARATOR)
        }
    }

    fn fallback(&self, key: FaultKey) -> String {
        self.table.get(key).description.to_string()
    }
}

// A fault contributes its own message only; its Display repeats the key.
fn level_message(level: &(dyn StdError + 'static)) -> Option<String> {
    match level.downcast_ref::<WsFault>() {
        Some(fault) => fault.message().map(str::to_string),
        None => Some(level.to_string()),
    }
}
