//! Pricing ratios and per-request price data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named cost multipliers. Settlement multiplies the base unit price by the
/// product of every value present.
///
/// Every stored value is finite and strictly positive: anything else is
/// replaced by the neutral `1.0` at insertion time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PricingRatioMap(BTreeMap<String, f64>);

impl PricingRatioMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        let value = if value.is_finite() && value > 0.0 {
            value
        } else {
            tracing::warn!(ratio = %name, value, "non-positive pricing ratio replaced with 1.0");
            1.0
        };
        self.0.insert(name, value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Product of all ratios (1.0 when empty).
    pub fn product(&self) -> f64 {
        self.0.values().product()
    }
}

impl From<BTreeMap<String, f64>> for PricingRatioMap {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let mut map = Self::new();
        for (k, v) in raw {
            map.insert(k, v);
        }
        map
    }
}

impl From<PricingRatioMap> for BTreeMap<String, f64> {
    fn from(map: PricingRatioMap) -> Self {
        map.0
    }
}

/// Price information attached to one relay request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    /// Base unit price (flat per call when `use_price` is set)
    pub model_price: f64,
    /// Whether the model is billed at a flat per-call price
    pub use_price: bool,
    #[serde(default)]
    pub other_ratios: PricingRatioMap,
}

impl PriceData {
    pub fn fixed(model_price: f64) -> Self {
        Self {
            model_price,
            use_price: true,
            other_ratios: PricingRatioMap::new(),
        }
    }

    /// Scale a flat per-call price down when fewer results were produced than
    /// requested, so settlement refunds the shortfall.
    ///
    /// Returns `true` when the price was changed.
    pub fn adjust_for_partial_result(&mut self, produced: usize, requested: Option<u32>) -> bool {
        if !self.use_price {
            return false;
        }
        let Some(requested) = requested.filter(|n| *n > 0) else {
            return false;
        };
        if produced >= requested as usize {
            return false;
        }
        self.model_price = self.model_price / f64::from(requested) * produced as f64;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_are_never_non_positive() {
        let map = PricingRatioMap::new()
            .with("seconds", 0.0)
            .with("audio", -2.0)
            .with("mode", f64::NAN)
            .with("size", 1.5);
        assert_eq!(map.get("seconds"), Some(1.0));
        assert_eq!(map.get("audio"), Some(1.0));
        assert_eq!(map.get("mode"), Some(1.0));
        assert_eq!(map.get("size"), Some(1.5));
        assert!(map.iter().all(|(_, v)| v > 0.0));
    }

    #[test]
    fn deserialized_ratios_are_sanitized() {
        let map: PricingRatioMap = serde_json::from_str(r#"{"seconds": 0, "audio": 2}"#).unwrap();
        assert_eq!(map.get("seconds"), Some(1.0));
        assert_eq!(map.product(), 2.0);
    }

    #[test]
    fn partial_result_scales_fixed_price() {
        let mut price = PriceData::fixed(0.8);
        assert!(price.adjust_for_partial_result(3, Some(4)));
        assert!((price.model_price - 0.6).abs() < 1e-12);
    }

    #[test]
    fn no_adjustment_when_complete_unknown_or_ratio_billed() {
        let mut price = PriceData::fixed(1.0);
        assert!(!price.adjust_for_partial_result(4, Some(4)));
        assert!(!price.adjust_for_partial_result(5, Some(4)));
        assert!(!price.adjust_for_partial_result(1, None));
        assert!(!price.adjust_for_partial_result(1, Some(0)));
        assert_eq!(price.model_price, 1.0);

        let mut ratio_billed = PriceData {
            model_price: 1.0,
            use_price: false,
            other_ratios: PricingRatioMap::new(),
        };
        assert!(!ratio_billed.adjust_for_partial_result(1, Some(4)));
    }
}
