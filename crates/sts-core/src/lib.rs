//! # sts-core
//!
//! Shared building blocks for the Security Token Service.
//!
//! - [`fault`]: the immutable WS-Security / WS-Trust fault table and the
//!   [`WsFault`] error carrying a fault key and a cause chain
//! - [`config`]: [`StsConfig`], loaded from the environment or TOML

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fault;

pub use config::StsConfig;
pub use error::{CoreError, CoreResult};
pub use fault::{BoxError, FaultCode, FaultKey, FaultNamespace, FaultTable, WsFault};
