//! HTTP helpers

pub mod headers;
pub mod transport;
