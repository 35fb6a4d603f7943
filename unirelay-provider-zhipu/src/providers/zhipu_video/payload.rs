//! Canonical video request -> Zhipu submit body

use super::types::ZhipuVideoRequest;
use serde_json::Value;
use unirelay_core::types::VideoRequest;

/// Model used when the caller leaves `model` empty.
pub const DEFAULT_MODEL: &str = "cogvideox-3";

fn non_empty(v: &Option<String>) -> Option<String> {
    v.clone().filter(|s| !s.is_empty())
}

fn meta_str(req: &VideoRequest, key: &str) -> Option<String> {
    req.metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `fps` may arrive as an integer or a float; floats are truncated.
fn meta_fps(req: &VideoRequest) -> Option<i64> {
    let v = req.metadata.get("fps")?;
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

/// Image input when no structured `content` is given: a direct `image_url`
/// wins, then `images` (list when several, scalar when one), then `image`.
fn image_reference(req: &VideoRequest) -> Option<Value> {
    if let Some(direct) = &req.image_url {
        return Some(direct.clone());
    }
    match req.images.as_slice() {
        [] => req
            .image
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.clone())),
        [single] => Some(Value::String(single.clone())),
        many => Some(Value::from(many.to_vec())),
    }
}

pub fn build_payload(req: &VideoRequest) -> ZhipuVideoRequest {
    let model = if req.model.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        req.model.clone()
    };

    let mut body = ZhipuVideoRequest {
        model,
        quality: non_empty(&req.quality),
        with_audio: req.with_audio,
        watermark_enabled: req.watermark_enabled,
        size: non_empty(&req.size),
        fps: req.fps.filter(|f| *f != 0),
        duration: req.duration.filter(|d| *d > 0),
        request_id: non_empty(&req.request_id),
        first_frame_image: non_empty(&req.first_frame_image),
        last_frame_image: non_empty(&req.last_frame_image),
        aspect_ratio: non_empty(&req.aspect_ratio),
        negative_prompt: non_empty(&req.negative_prompt),
        person_generation: non_empty(&req.person_generation),
        sample_count: req.sample_count.filter(|n| *n != 0),
        seed: req.seed.filter(|s| *s != 0),
        resize_mode: non_empty(&req.resize_mode),
        compression_quality: non_empty(&req.compression_quality),
        generate_audio: req.generate_audio,
        service_tier: non_empty(&req.service_tier),
        execution_expires_after: req.execution_expires_after.filter(|t| *t != 0),
        resolution: non_empty(&req.resolution),
        prompt_optimizer: req.prompt_optimizer,
        fast_pretreatment: req.fast_pretreatment,
        ..Default::default()
    };

    // Content-array families (seedance) carry text and images in one field.
    if let Some(content) = &req.content {
        body.content = Some(content.clone());
    } else {
        body.prompt = req.prompt.clone();
        body.image_url = image_reference(req);
    }

    if body.quality.is_none() {
        body.quality = meta_str(req, "quality");
    }
    if body.watermark_enabled.is_none() {
        body.watermark_enabled = req.metadata.get("watermark_enabled").and_then(Value::as_bool);
    }
    if body.fps.is_none() {
        body.fps = meta_fps(req).filter(|f| *f != 0);
    }
    body.user_id = meta_str(req, "user_id");
    if body.first_frame_image.is_none() {
        body.first_frame_image = meta_str(req, "first_frame_image");
    }
    if body.last_frame_image.is_none() {
        body.last_frame_image = meta_str(req, "last_frame_image");
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(req: &VideoRequest) -> Value {
        serde_json::to_value(build_payload(req)).unwrap()
    }

    #[test]
    fn empty_model_defaults() {
        let body = build_payload(&VideoRequest::new("", "a cat"));
        assert_eq!(body.model, "cogvideox-3");
        assert_eq!(body.prompt, "a cat");
    }

    #[test]
    fn content_replaces_prompt_and_images() {
        let mut req = VideoRequest::new("doubao-seedance-1-0-pro", "ignored");
        req.content = Some(json!([{"type": "text", "text": "a dog"}]));
        req.images = vec!["https://img/1.png".into()];
        let v = to_json(&req);
        assert_eq!(v["content"][0]["text"], "a dog");
        assert!(v.get("prompt").is_none());
        assert!(v.get("image_url").is_none());
    }

    #[test]
    fn image_reference_precedence() {
        let mut req = VideoRequest::new("cogvideox-3", "p");
        req.image = Some("https://img/single.png".into());
        assert_eq!(to_json(&req)["image_url"], "https://img/single.png");

        req.images = vec!["https://img/a.png".into()];
        assert_eq!(to_json(&req)["image_url"], "https://img/a.png");

        req.images.push("https://img/b.png".into());
        assert_eq!(
            to_json(&req)["image_url"],
            json!(["https://img/a.png", "https://img/b.png"])
        );

        req.image_url = Some(json!("https://img/direct.png"));
        assert_eq!(to_json(&req)["image_url"], "https://img/direct.png");
    }

    #[test]
    fn unset_size_and_duration_are_omitted() {
        let req = VideoRequest::new("cogvideox-3", "p").with_duration(0);
        let v = to_json(&req);
        assert!(v.get("size").is_none());
        assert!(v.get("duration").is_none());

        let mut req = req.with_duration(10);
        req.size = Some("1920x1080".into());
        let v = to_json(&req);
        assert_eq!(v["duration"], 10);
        assert_eq!(v["size"], "1920x1080");
    }

    #[test]
    fn zero_numeric_options_are_omitted() {
        let mut req = VideoRequest::new("veo-3.0-generate-001", "p");
        req.sample_count = Some(0);
        req.seed = Some(0);
        req.execution_expires_after = Some(0);
        req.fps = Some(0);
        let v = to_json(&req);
        for key in ["sample_count", "seed", "execution_expires_after", "fps"] {
            assert!(v.get(key).is_none(), "{key} should be omitted");
        }

        req.sample_count = Some(2);
        req.seed = Some(42);
        req.execution_expires_after = Some(3600);
        let v = to_json(&req);
        assert_eq!(v["sample_count"], 2);
        assert_eq!(v["seed"], 42);
        assert_eq!(v["execution_expires_after"], 3600);
    }

    #[test]
    fn metadata_fills_unset_fields() {
        let req = VideoRequest::new("cogvideox-3", "p")
            .with_metadata("quality", json!("speed"))
            .with_metadata("watermark_enabled", json!(false))
            .with_metadata("fps", json!(60.0))
            .with_metadata("user_id", json!("u-42"))
            .with_metadata("first_frame_image", json!("https://img/f.png"))
            .with_metadata("last_frame_image", json!("https://img/l.png"));
        let body = build_payload(&req);
        assert_eq!(body.quality.as_deref(), Some("speed"));
        assert_eq!(body.watermark_enabled, Some(false));
        assert_eq!(body.fps, Some(60));
        assert_eq!(body.user_id.as_deref(), Some("u-42"));
        assert_eq!(body.first_frame_image.as_deref(), Some("https://img/f.png"));
        assert_eq!(body.last_frame_image.as_deref(), Some("https://img/l.png"));
    }

    #[test]
    fn typed_fields_win_over_metadata() {
        let mut req = VideoRequest::new("cogvideox-3", "p")
            .with_metadata("quality", json!("speed"))
            .with_metadata("watermark_enabled", json!(false))
            .with_metadata("fps", json!(60));
        req.quality = Some("quality".into());
        req.watermark_enabled = Some(true);
        req.fps = Some(30);
        let body = build_payload(&req);
        assert_eq!(body.quality.as_deref(), Some("quality"));
        assert_eq!(body.watermark_enabled, Some(true));
        assert_eq!(body.fps, Some(30));
    }

    #[test]
    fn metadata_of_wrong_type_is_ignored() {
        let req = VideoRequest::new("cogvideox-3", "p")
            .with_metadata("fps", json!("sixty"))
            .with_metadata("user_id", json!(42));
        let body = build_payload(&req);
        assert_eq!(body.fps, None);
        assert_eq!(body.user_id, None);
    }
}
