//! Error handling types for unirelay.
//!
//! This module is intentionally dependency-light and shared across crates.

mod conversions;
pub mod types;

pub use types::*;
