//! # unirelay
//!
//! One canonical request/response contract over many generative-AI provider
//! APIs. A gateway builds a [`RelayInfo`] per call, picks an adaptor for the
//! configured channel and lets it translate, send and normalize:
//!
//! ```rust,ignore
//! use unirelay::prelude::*;
//!
//! let config = ChannelConfig::from_env(ChannelType::ZhipuV4)?;
//! let adaptor = unirelay::adaptor_for(config)?;
//! let mut info = RelayInfo::new(
//!     RelayFormat::OpenAi,
//!     RelayMode::ImagesGenerations,
//!     CanonicalRequest::Image(ImageRequest::new("cogview-4", "a red fox")),
//! );
//! let output = adaptor.relay(&mut info).await?;
//! ```
//!
//! Asynchronous jobs (video) go through [`task_adaptor_for`] instead:
//! `validate_and_price`, `submit`, then `poll` until the task is terminal.
#![deny(unsafe_code)]

pub mod factory;
pub mod observability;

pub use factory::{adaptor_for, task_adaptor_for};

pub use unirelay_core::adaptor::{ChannelAdaptor, RelayOutput, SubmitOutcome, TaskAdaptor};
pub use unirelay_core::channel::{ChannelConfig, ChannelSpecialBase, ChannelType};
pub use unirelay_core::pricing::{PricingRegistry, PricingRule};
pub use unirelay_core::{RelayFormat, RelayInfo, RelayMode};
pub use unirelay_spec::error::RelayError;
pub use unirelay_spec::types;

/// Provider crates, for callers that want concrete adaptor types.
pub mod providers {
    pub use unirelay_provider_zhipu as zhipu;
}

pub mod prelude {
    pub use crate::factory::{adaptor_for, task_adaptor_for};
    pub use unirelay_core::adaptor::{ChannelAdaptor, RelayOutput, SubmitOutcome, TaskAdaptor};
    pub use unirelay_core::channel::{ChannelConfig, ChannelType};
    pub use unirelay_core::{RelayFormat, RelayInfo, RelayMode};
    pub use unirelay_spec::error::RelayError;
    pub use unirelay_spec::types::{
        AudioRequest, CanonicalRequest, ChatRequest, EmbeddingRequest, ImageRequest, PriceData,
        Task, TaskStatus, Usage, VideoObject, VideoRequest,
    };
}
