//! unirelay-provider-zhipu
//!
//! Zhipu BigModel channel family:
//! - [`ZhipuAdaptor`]: synchronous chat / image / TTS / embedding / element /
//!   identify-face relay, including the image response normalizer.
//! - [`ZhipuVideoAdaptor`]: asynchronous video jobs (submit, poll, convert)
//!   with per-model pricing.
#![deny(unsafe_code)]

pub mod providers;

pub use providers::zhipu::ZhipuAdaptor;
pub use providers::zhipu_video::ZhipuVideoAdaptor;
pub use providers::zhipu_video::pricing::pricing_registry;
