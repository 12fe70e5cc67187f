//! Command implementations.

pub mod canonicalize;
pub mod config;
pub mod faults;
pub mod verify;

pub use canonicalize::run_canonicalize;
pub use config::run_config;
pub use faults::run_faults;
pub use verify::run_verify;
