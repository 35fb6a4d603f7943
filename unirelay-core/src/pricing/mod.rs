//! Pricing rule engine
//!
//! Maps a model name to a deterministic function of request attributes that
//! yields named cost multipliers. The settlement service multiplies the base
//! unit price by their product; this module never touches balances.

pub mod registry;
pub mod rules;

pub use registry::PricingRegistry;
pub use rules::{PricingFn, PricingRule};
