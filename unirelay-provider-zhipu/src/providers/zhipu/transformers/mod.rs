//! Canonical request -> Zhipu wire body

pub mod request;

pub use request::{ZhipuImageRequest, ZhipuTtsRequest, convert_request};
