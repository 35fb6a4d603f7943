//! Video model pricing table
//!
//! `ModelPrice` is configured externally per model; these rules only produce
//! the multipliers. Reference units: std/5s for Kling, 768P/6s for Hailuo,
//! per second without audio for Veo, offline/no-audio rate for Seedance.

use once_cell::sync::Lazy;
use unirelay_core::pricing::{PricingRegistry, PricingRule};

pub const SORA_WIDE_SIZES: &[&str] = &["1792x1024", "1024x1792"];
pub const SORA_WIDE_SIZE_RATIO: f64 = 1.666667;
pub const VEO_AUDIO_RATIO: f64 = 2.0;
pub const VEO_FAST_AUDIO_RATIO: f64 = 1.5;
pub const KLING_PRO_RATIO: f64 = 1.75;
pub const KLING_TURBO_PRO_RATIO: f64 = 5.0 / 3.0;
pub const SEEDANCE_ONLINE_RATIO: f64 = 2.0;
pub const SEEDANCE_AUDIO_RATIO: f64 = 2.0;

const HAILUO_23_FAST: &[(&str, f64)] = &[
    ("768P:6", 1.0),
    ("768P:10", 32.0 / 19.0),
    ("1080P:6", 33.0 / 19.0),
];

const HAILUO_23: &[(&str, f64)] = &[("768P:6", 1.0), ("768P:10", 2.0), ("1080P:6", 1.75)];

const HAILUO_02: &[(&str, f64)] = &[
    ("512P:6", 10.0 / 28.0),
    ("512P:10", 15.0 / 28.0),
    ("768P:6", 1.0),
    ("768P:10", 2.0),
    ("1080P:6", 1.75),
];

fn per_second(default_duration: i64) -> PricingRule {
    PricingRule::PerSecond { default_duration }
}

fn veo(audio_ratio: f64) -> PricingRule {
    PricingRule::PerSecondWithAudio {
        default_duration: 5,
        audio_ratio,
    }
}

fn kling(pro_ratio: Option<f64>) -> PricingRule {
    PricingRule::PerFiveSeconds {
        default_duration: 5,
        pro_ratio,
    }
}

fn hailuo(table: &'static [(&'static str, f64)]) -> PricingRule {
    PricingRule::ResolutionTable {
        default_resolution: "768P",
        default_duration: 6,
        table,
    }
}

static REGISTRY: Lazy<PricingRegistry> = Lazy::new(|| {
    PricingRegistry::new()
        .with_rule("cogvideox", per_second(5))
        .with_rule(
            "sora-2",
            PricingRule::PerSecondWithSize {
                default_duration: 4,
                sizes: SORA_WIDE_SIZES,
                size_ratio: SORA_WIDE_SIZE_RATIO,
            },
        )
        .with_rule(
            "sora-2-pro",
            PricingRule::PerSecondWithSize {
                default_duration: 4,
                sizes: SORA_WIDE_SIZES,
                size_ratio: SORA_WIDE_SIZE_RATIO,
            },
        )
        .with_rule("veo-3.0-generate", veo(VEO_AUDIO_RATIO))
        .with_rule("veo-3.1-generate", veo(VEO_AUDIO_RATIO))
        .with_rule("veo-3.0-fast-generate", veo(VEO_FAST_AUDIO_RATIO))
        .with_rule("veo-3.1-fast-generate", veo(VEO_FAST_AUDIO_RATIO))
        .with_rule("kling-v1-6", kling(Some(KLING_PRO_RATIO)))
        .with_rule("kling-multi-v1-6", kling(Some(KLING_PRO_RATIO)))
        .with_rule("kling-v2-1", kling(Some(KLING_PRO_RATIO)))
        .with_rule("kling-v2-master", kling(None))
        .with_rule("kling-v2-1-master", kling(None))
        .with_rule("kling-v2-5-turbo", kling(Some(KLING_TURBO_PRO_RATIO)))
        .with_rule(
            "doubao-seedance",
            PricingRule::TokenTier {
                online_ratio: SEEDANCE_ONLINE_RATIO,
                audio_ratio: SEEDANCE_AUDIO_RATIO,
            },
        )
        .with_rule("minimax-hailuo-2.3-Fast", hailuo(HAILUO_23_FAST))
        .with_rule("minimax-hailuo-2.3", hailuo(HAILUO_23))
        .with_rule("minimax-hailuo-02", hailuo(HAILUO_02))
        .with_fallback(per_second(5))
});

/// Process-wide read-only pricing registry for Zhipu video models.
pub fn pricing_registry() -> &'static PricingRegistry {
    &REGISTRY
}
