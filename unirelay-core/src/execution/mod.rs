//! Execution layer: HTTP transport, header building, raw responses.

pub mod http;
pub mod response;

pub use http::headers::HttpHeaderBuilder;
pub use http::transport::{HttpTransport, HttpTransportRequest, ReqwestTransport};
pub use response::{RawResponse, error_from_response};
