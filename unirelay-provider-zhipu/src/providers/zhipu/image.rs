//! Image generation response normalizer
//!
//! Turns a Zhipu image response into the OpenAI-shaped canonical payload:
//! error envelope first, then per-item URL / base64 resolution with a
//! fail-open policy (an unusable item is skipped, the batch survives), usage
//! normalization, and the flat-price refund for short batches.

use futures::future::join_all;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use unirelay_core::RelayInfo;
use unirelay_core::adaptor::RelayOutput;
use unirelay_core::encoding::{null_as_default, to_json_bytes};
use unirelay_core::error::RelayError;
use unirelay_core::execution::RawResponse;
use unirelay_core::media::{ImageFetcher, is_remote_url};
use unirelay_core::types::{ImageData, ImageEncoding, ImageRequest, ImageResponse, Usage};

pub(crate) const IMAGE_ERROR_TYPE: &str = "zhipu_image_error";

/// Accept a string, a number, or null for provider error codes.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ZhipuImageError {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ZhipuImageItem {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub b64_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ZhipuImageResponse {
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ZhipuImageItem>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default)]
    pub error: Option<ZhipuImageError>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Output encoding the caller asked for: top-level `response_format`, else
/// `sequential_image_generation_options.response_format`, else inline.
pub(crate) fn requested_encoding(req: Option<&ImageRequest>) -> ImageEncoding {
    let Some(req) = req else {
        return ImageEncoding::B64Json;
    };
    let top = req.response_format.as_deref().filter(|f| !f.is_empty());
    let nested = || {
        req.extra
            .get("sequential_image_generation_options")
            .and_then(|opts| opts.get("response_format"))
            .and_then(Value::as_str)
    };
    ImageEncoding::from_format(top.or_else(nested))
}

async fn resolve_item(
    index: usize,
    item: &ZhipuImageItem,
    encoding: ImageEncoding,
    fetcher: &dyn ImageFetcher,
) -> Option<ImageData> {
    let url = non_empty(&item.url).or_else(|| non_empty(&item.image_url));

    if encoding == ImageEncoding::Url
        && let Some(url) = url.filter(|u| is_remote_url(u))
    {
        return Some(ImageData::from_url(url));
    }

    if let Some(b64) = non_empty(&item.b64_json).or_else(|| non_empty(&item.b64_image)) {
        return Some(ImageData::from_b64(b64));
    }

    match url {
        Some(url) if is_remote_url(url) => match fetcher.fetch_base64(url).await {
            Ok(img) if !img.data.is_empty() => {
                tracing::debug!(index, mime_type = %img.mime_type, "zhipu image inlined");
                Some(ImageData::from_b64(img.data))
            }
            Ok(_) => {
                tracing::warn!(index, "zhipu image download returned empty data, item skipped");
                None
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "zhipu image download failed, item skipped");
                None
            }
        },
        // The url field already carries base64 content.
        Some(raw) => Some(ImageData::from_b64(raw)),
        None => {
            tracing::warn!(index, "zhipu image item has neither url nor base64, item skipped");
            None
        }
    }
}

/// Normalize a successful (2xx) image response.
pub(crate) async fn handle_image_response(
    info: &mut RelayInfo,
    resp: &RawResponse,
    fetcher: &dyn ImageFetcher,
) -> Result<RelayOutput, RelayError> {
    let zhipu: ZhipuImageResponse = resp.json()?;

    if let Some(err) = zhipu.error.as_ref().filter(|e| !e.message.is_empty()) {
        return Err(RelayError::provider_typed(
            resp.status,
            err.code.clone(),
            err.message.clone(),
            IMAGE_ERROR_TYPE,
        ));
    }

    let image_req = info.request.as_image();
    let encoding = requested_encoding(image_req);
    let requested = image_req.and_then(ImageRequest::requested_count);

    // Items are independent: resolve concurrently, keep upstream order.
    let resolved = join_all(
        zhipu
            .data
            .iter()
            .enumerate()
            .map(|(i, item)| resolve_item(i, item, encoding, fetcher)),
    )
    .await;
    let data: Vec<ImageData> = resolved.into_iter().flatten().collect();

    if data.len() < zhipu.data.len() {
        tracing::info!(
            produced = data.len(),
            received = zhipu.data.len(),
            "zhipu image batch partially resolved"
        );
    }

    let usage = zhipu.usage.map(Usage::normalized).unwrap_or_default();

    if info.price_data.adjust_for_partial_result(data.len(), requested) {
        tracing::info!(
            produced = data.len(),
            requested = ?requested,
            model_price = info.price_data.model_price,
            "fixed image price scaled to produced count"
        );
    }

    let payload = ImageResponse {
        created: zhipu
            .created
            .filter(|c| *c != 0)
            .unwrap_or_else(|| info.start_time.timestamp()),
        data,
        usage: Some(usage.clone()),
    };
    Ok(RelayOutput::json(to_json_bytes(&payload)?, usage))
}
