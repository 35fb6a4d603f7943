//! Model-name to pricing-rule resolution

use super::rules::PricingRule;
use crate::types::{PricingRatioMap, VideoRequest};
use std::collections::BTreeMap;

/// Registry of pricing rules keyed by model name or model-name prefix.
///
/// Resolution order for a model `m`:
/// 1. a key equal to `m`;
/// 2. the longest key that is a prefix of `m` (lexicographically smallest
///    key among equally long ones);
/// 3. the fallback rule.
///
/// Built once and read-only afterwards; safe to share behind a `Lazy`.
#[derive(Debug, Clone)]
pub struct PricingRegistry {
    rules: BTreeMap<String, PricingRule>,
    fallback: PricingRule,
}

impl Default for PricingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingRegistry {
    /// Empty registry with per-second fallback (default duration 5).
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
            fallback: PricingRule::PerSecond { default_duration: 5 },
        }
    }

    /// Register a rule. Adding a model family never touches existing rules.
    pub fn with_rule(mut self, key: impl Into<String>, rule: PricingRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    pub fn with_fallback(mut self, rule: PricingRule) -> Self {
        self.fallback = rule;
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Registry key that governs `model`, or `None` when the fallback applies.
    pub fn resolve_key(&self, model: &str) -> Option<&str> {
        if let Some((key, _)) = self.rules.get_key_value(model) {
            return Some(key.as_str());
        }
        // Ascending iteration plus a strict `>` keeps the smallest key on ties.
        let mut best: Option<&str> = None;
        for key in self.rules.keys() {
            if model.starts_with(key.as_str()) && key.len() > best.map_or(0, str::len) {
                best = Some(key.as_str());
            }
        }
        best
    }

    pub fn resolve(&self, model: &str) -> &PricingRule {
        self.resolve_key(model)
            .and_then(|key| self.rules.get(key))
            .unwrap_or(&self.fallback)
    }

    /// Ratio map for `req` under the rule that governs `model`.
    pub fn price(&self, model: &str, req: &VideoRequest) -> PricingRatioMap {
        let ratios = self.resolve(model).evaluate(req);
        tracing::debug!(
            model,
            rule = ?self.resolve_key(model),
            ratios = ?ratios,
            "resolved pricing ratios"
        );
        ratios
    }
}
