//! Canonical data model shared by every adaptor.

pub mod image;
pub mod pricing;
pub mod request;
pub mod task;
pub mod usage;
pub mod video;

pub use image::{ImageData, ImageEncoding, ImageResponse};
pub use pricing::{PriceData, PricingRatioMap};
pub use request::{
    AudioRequest, CanonicalRequest, ChatRequest, ElementRequest, EmbeddingRequest,
    IdentifyFaceRequest, ImageRequest, Modality, VideoRequest,
};
pub use task::{Task, TaskInfo, TaskResult, TaskStatus};
pub use usage::Usage;
pub use video::{VideoError, VideoObject};
