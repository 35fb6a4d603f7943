//! Declarative pricing rules, one variant per billing family

use crate::types::{PricingRatioMap, VideoRequest};
use std::fmt;
use std::sync::Arc;

pub const RATIO_SECONDS: &str = "seconds";
pub const RATIO_SIZE: &str = "size";
pub const RATIO_AUDIO: &str = "audio";
pub const RATIO_SAMPLE_COUNT: &str = "sample_count";
pub const RATIO_MODE: &str = "mode";
pub const RATIO_SERVICE_TIER: &str = "service_tier";
pub const RATIO_PRICE: &str = "price";

/// Extension point for families the built-in variants cannot express.
pub type PricingFn = Arc<dyn Fn(&VideoRequest) -> PricingRatioMap + Send + Sync>;

/// One billing family.
///
/// Every variant treats a request duration `<= 0` as unset and falls back to
/// its own default duration.
#[derive(Clone)]
pub enum PricingRule {
    /// `seconds = duration`
    PerSecond { default_duration: i64 },
    /// `seconds = duration`; `size = size_ratio` when the requested size is listed
    PerSecondWithSize {
        default_duration: i64,
        sizes: &'static [&'static str],
        size_ratio: f64,
    },
    /// `seconds = duration`; `audio = audio_ratio` when `with_audio`;
    /// `sample_count = max(1, requested count)`
    PerSecondWithAudio {
        default_duration: i64,
        audio_ratio: f64,
    },
    /// `seconds = duration / 5`; `mode = pro_ratio` when mode is `"pro"`.
    /// Without a pro ratio no `mode` entry is produced.
    PerFiveSeconds {
        default_duration: i64,
        pro_ratio: Option<f64>,
    },
    /// Token-billed: `service_tier` unless the tier is `"flex"`, `audio` when
    /// `generate_audio`. Final charge is reconciled against reported tokens.
    TokenTier {
        online_ratio: f64,
        audio_ratio: f64,
    },
    /// `price = table["<resolution>:<duration>"]`, `1.0` for unknown keys
    ResolutionTable {
        default_resolution: &'static str,
        default_duration: i64,
        table: &'static [(&'static str, f64)],
    },
    Custom(PricingFn),
}

impl fmt::Debug for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerSecond { default_duration } => f
                .debug_struct("PerSecond")
                .field("default_duration", default_duration)
                .finish(),
            Self::PerSecondWithSize {
                default_duration,
                sizes,
                size_ratio,
            } => f
                .debug_struct("PerSecondWithSize")
                .field("default_duration", default_duration)
                .field("sizes", sizes)
                .field("size_ratio", size_ratio)
                .finish(),
            Self::PerSecondWithAudio {
                default_duration,
                audio_ratio,
            } => f
                .debug_struct("PerSecondWithAudio")
                .field("default_duration", default_duration)
                .field("audio_ratio", audio_ratio)
                .finish(),
            Self::PerFiveSeconds {
                default_duration,
                pro_ratio,
            } => f
                .debug_struct("PerFiveSeconds")
                .field("default_duration", default_duration)
                .field("pro_ratio", pro_ratio)
                .finish(),
            Self::TokenTier {
                online_ratio,
                audio_ratio,
            } => f
                .debug_struct("TokenTier")
                .field("online_ratio", online_ratio)
                .field("audio_ratio", audio_ratio)
                .finish(),
            Self::ResolutionTable {
                default_resolution,
                default_duration,
                table,
            } => f
                .debug_struct("ResolutionTable")
                .field("default_resolution", default_resolution)
                .field("default_duration", default_duration)
                .field("table", table)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

fn flag(v: Option<bool>) -> bool {
    v.unwrap_or(false)
}

impl PricingRule {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&VideoRequest) -> PricingRatioMap + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Evaluate this rule against a request.
    pub fn evaluate(&self, req: &VideoRequest) -> PricingRatioMap {
        let mut ratios = PricingRatioMap::new();
        match self {
            Self::PerSecond { default_duration } => {
                ratios.insert(RATIO_SECONDS, req.duration_or(*default_duration) as f64);
            }
            Self::PerSecondWithSize {
                default_duration,
                sizes,
                size_ratio,
            } => {
                ratios.insert(RATIO_SECONDS, req.duration_or(*default_duration) as f64);
                let listed = req
                    .size
                    .as_deref()
                    .is_some_and(|size| sizes.iter().any(|s| *s == size));
                ratios.insert(RATIO_SIZE, if listed { *size_ratio } else { 1.0 });
            }
            Self::PerSecondWithAudio {
                default_duration,
                audio_ratio,
            } => {
                ratios.insert(RATIO_SECONDS, req.duration_or(*default_duration) as f64);
                let audio = if flag(req.with_audio) { *audio_ratio } else { 1.0 };
                ratios.insert(RATIO_AUDIO, audio);
                let count = req.sample_count.unwrap_or(1).max(1);
                ratios.insert(RATIO_SAMPLE_COUNT, f64::from(count));
            }
            Self::PerFiveSeconds {
                default_duration,
                pro_ratio,
            } => {
                ratios.insert(
                    RATIO_SECONDS,
                    req.duration_or(*default_duration) as f64 / 5.0,
                );
                if let Some(pro) = pro_ratio {
                    let mode = if req.mode.as_deref() == Some("pro") { *pro } else { 1.0 };
                    ratios.insert(RATIO_MODE, mode);
                }
            }
            Self::TokenTier {
                online_ratio,
                audio_ratio,
            } => {
                let tier = if req.service_tier.as_deref() == Some("flex") {
                    1.0
                } else {
                    *online_ratio
                };
                ratios.insert(RATIO_SERVICE_TIER, tier);
                let audio = if flag(req.generate_audio) { *audio_ratio } else { 1.0 };
                ratios.insert(RATIO_AUDIO, audio);
            }
            Self::ResolutionTable {
                default_resolution,
                default_duration,
                table,
            } => {
                let resolution = req
                    .resolution
                    .as_deref()
                    .filter(|r| !r.is_empty())
                    .unwrap_or(*default_resolution);
                let key = format!("{resolution}:{}", req.duration_or(*default_duration));
                let price = table
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| *v)
                    .unwrap_or(1.0);
                ratios.insert(RATIO_PRICE, price);
            }
            Self::Custom(f) => return f(req),
        }
        ratios
    }
}
