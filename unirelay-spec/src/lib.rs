//! unirelay-spec
//!
//! Canonical request/response types, pricing ratios, task records and the
//! error taxonomy shared by every unirelay crate. Dependency-light on purpose:
//! nothing here talks to the network.
#![deny(unsafe_code)]

pub mod error;
pub mod types;

pub use error::RelayError;
