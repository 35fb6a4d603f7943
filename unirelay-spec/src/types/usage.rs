//! Token usage counters

use serde::{Deserialize, Serialize};

fn is_zero(v: &u64) -> bool {
    *v == 0
}

/// Usage reported by a provider (or estimated when it reports nothing).
///
/// Providers disagree on names: OpenAI-style `prompt_tokens`/`completion_tokens`
/// versus `input_tokens`/`output_tokens`. Both are accepted; call
/// [`Usage::normalize`] before settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub input_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub output_tokens: u64,
}

impl Usage {
    /// Usage for endpoints that report nothing: prompt == total == estimate.
    pub fn estimated(prompt_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            total_tokens: prompt_tokens,
            ..Default::default()
        }
    }

    /// Copy alternate-named counters over zero primaries, then derive the total.
    pub fn normalize(&mut self) {
        if self.prompt_tokens == 0 && self.input_tokens != 0 {
            self.prompt_tokens = self.input_tokens;
        }
        if self.completion_tokens == 0 && self.output_tokens != 0 {
            self.completion_tokens = self.output_tokens;
        }
        if self.total_tokens == 0 {
            self.total_tokens = self.prompt_tokens + self.completion_tokens;
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}
