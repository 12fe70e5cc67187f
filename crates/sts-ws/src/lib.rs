//! # sts-ws
//!
//! WS-Trust operations and SOAP fault mapping.
//!
//! - [`Sts`]: issue, renew, validate and challenge for one tenant, with
//!   bounded caches for pending SPNEGO and SecurID negotiations
//! - [`MultiTenantSts`]: routes calls by tenant name
//! - [`FaultMapper`]: turns [`StsError`] values into SOAP 1.1 faults
//!
//! ## Example
//!
//! ```ignore
//! use sts_ws::{FaultMapper, FaultResponse};
//!
//! match registry.issue("vsphere.local", &request).await {
//!     Ok(response) => send(response),
//!     Err(err) => match FaultMapper::default().map(&err) {
//!         FaultResponse::Soap(fault) => reply(500, fault.to_xml()?),
//!         FaultResponse::NotFound { .. } => reply(404, String::new()),
//!     },
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authority;
pub mod error;
pub mod fault_mapper;
pub mod response;
pub mod session;
pub mod sts;
pub mod tenants;

#[cfg(test)]
pub(crate) mod testutil;

pub use authority::{AuthorityError, TokenAuthority, TokenSpec};
pub use error::{StsError, StsResult};
pub use fault_mapper::{DESCRIPTION_SEPARATOR, FaultMapper, FaultResponse, SoapFault};
pub use response::{IssueResponse, IssuedToken};
pub use session::NegotiationSessions;
pub use sts::{Sts, StsServices};
pub use tenants::MultiTenantSts;
