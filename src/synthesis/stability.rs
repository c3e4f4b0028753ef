use crate::{
    error::{GenerationError, Result},
    models::{BackendKind, ConfigUsed, GenerationRequest, DEFAULT_ASPECT_RATIO},
    synthesis::traits::{base_config, first_image, require_init_image, to_payload, SynthesisBackend},
};
use serde::Serialize;
use serde_json::Value;

/// Aspect ratios the Stability models accept verbatim.
pub const STABILITY_ASPECT_RATIOS: &[&str] =
    &["1:1", "16:9", "21:9", "2:3", "3:2", "4:5", "5:4", "9:16", "9:21"];

const OUTPUT_FORMAT: &str = "png";

pub fn stability_aspect_ratio(label: &str) -> &str {
    if STABILITY_ASPECT_RATIOS.contains(&label) {
        label
    } else {
        log::warn!(
            "Aspect ratio '{}' is not supported by Stability, using {}",
            label,
            DEFAULT_ASPECT_RATIO
        );
        DEFAULT_ASPECT_RATIO
    }
}

#[derive(Debug, Serialize)]
struct TextToImagePayload<'a> {
    prompt: &'a str,
    output_format: &'a str,
    mode: &'a str,
    aspect_ratio: &'a str,
}

#[derive(Debug, Serialize)]
struct ImageToImagePayload<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    negative_prompt: &'a str,
    mode: &'a str,
    image: &'a str,
    strength: f64,
    output_format: &'a str,
}

fn parse_stability(response: &Value) -> Result<String> {
    if let Some(image) = first_image(response) {
        return Ok(image);
    }

    let reason = response
        .get("finish_reasons")
        .and_then(|reasons| reasons.get(0))
        .and_then(Value::as_str);

    Err(GenerationError::synthesis(match reason {
        Some(reason) => format!("Model did not return image ({})", reason),
        None => "Model did not return image".to_string(),
    }))
}

fn resolve_model(default_model: &str, request: &GenerationRequest) -> String {
    request
        .model_id
        .clone()
        .unwrap_or_else(|| default_model.to_string())
}

pub struct TextToImageBackend {
    default_model: String,
}

impl TextToImageBackend {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
        }
    }
}

impl SynthesisBackend for TextToImageBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::TextToImage
    }

    fn model_id(&self, request: &GenerationRequest) -> String {
        resolve_model(&self.default_model, request)
    }

    fn build_payload(&self, request: &GenerationRequest, prompt: &str) -> Result<Value> {
        to_payload(&TextToImagePayload {
            prompt,
            output_format: OUTPUT_FORMAT,
            mode: "text-to-image",
            aspect_ratio: stability_aspect_ratio(&request.aspect_ratio),
        })
    }

    fn parse_result(&self, response: &Value) -> Result<String> {
        parse_stability(response)
    }

    fn config_used(&self, request: &GenerationRequest) -> ConfigUsed {
        base_config(
            self.kind(),
            request,
            self.model_id(request),
            stability_aspect_ratio(&request.aspect_ratio),
        )
    }
}

/// Stability image-to-image; `strength` is forwarded as given.
pub struct StrengthImageToImageBackend {
    default_model: String,
}

impl StrengthImageToImageBackend {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
        }
    }
}

impl SynthesisBackend for StrengthImageToImageBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::StrengthImageToImage
    }

    fn model_id(&self, request: &GenerationRequest) -> String {
        resolve_model(&self.default_model, request)
    }

    fn validate(&self, request: &GenerationRequest) -> Result<()> {
        require_init_image(request).map(|_| ())
    }

    fn build_payload(&self, request: &GenerationRequest, prompt: &str) -> Result<Value> {
        to_payload(&ImageToImagePayload {
            prompt,
            negative_prompt: &request.negative_prompt,
            mode: "image-to-image",
            image: require_init_image(request)?,
            strength: request.strength,
            output_format: OUTPUT_FORMAT,
        })
    }

    fn parse_result(&self, response: &Value) -> Result<String> {
        parse_stability(response)
    }

    fn config_used(&self, request: &GenerationRequest) -> ConfigUsed {
        let mut config = base_config(
            self.kind(),
            request,
            self.model_id(request),
            &request.aspect_ratio,
        );
        if !request.negative_prompt.is_empty() {
            config.negative_prompt = Some(request.negative_prompt.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawGenerationRequest;
    use serde_json::json;
    use std::convert::TryFrom;

    fn request(body: Value) -> GenerationRequest {
        let raw: RawGenerationRequest = serde_json::from_value(body).unwrap();
        GenerationRequest::try_from(raw).unwrap()
    }

    #[test]
    fn text_to_image_payload() {
        let backend = TextToImageBackend::new("stability.sd3-5-large-v1:0");
        let req = request(json!({"prompt": "a cat", "aspect_ratio": "16:9"}));
        let payload = backend.build_payload(&req, "a fluffy cat").unwrap();
        assert_eq!(
            payload,
            json!({
                "prompt": "a fluffy cat",
                "output_format": "png",
                "mode": "text-to-image",
                "aspect_ratio": "16:9"
            })
        );
        assert_eq!(backend.model_id(&req), "stability.sd3-5-large-v1:0");
    }

    #[test]
    fn text_to_image_honours_model_override() {
        let backend = TextToImageBackend::new("stability.sd3-5-large-v1:0");
        let req = request(json!({"prompt": "a", "model_id": "stability.sd3-large-v1:0"}));
        assert_eq!(backend.model_id(&req), "stability.sd3-large-v1:0");
        assert_eq!(backend.config_used(&req).model_id, "stability.sd3-large-v1:0");
    }

    #[test]
    fn unsupported_aspect_ratio_degrades_to_square() {
        let backend = TextToImageBackend::new("m");
        let req = request(json!({"prompt": "a", "aspect_ratio": "4:3"}));
        let payload = backend.build_payload(&req, "a").unwrap();
        assert_eq!(payload["aspect_ratio"], "1:1");
        assert_eq!(backend.config_used(&req).aspect_ratio, "1:1");
    }

    #[test]
    fn text_to_image_never_needs_an_image() {
        let backend = TextToImageBackend::new("m");
        let req = request(json!({"prompt": "a"}));
        assert!(backend.validate(&req).is_ok());
    }

    #[test]
    fn strength_payload_forwards_strength_unclamped() {
        let backend = StrengthImageToImageBackend::new("m");
        let req = request(json!({
            "prompt": "a", "mode": "img2img", "init_image": "aW1n", "strength": 1.5
        }));
        let payload = backend.build_payload(&req, "better a").unwrap();
        assert_eq!(
            payload,
            json!({
                "prompt": "better a",
                "mode": "image-to-image",
                "image": "aW1n",
                "strength": 1.5,
                "output_format": "png"
            })
        );
    }

    #[test]
    fn strength_payload_includes_negative_prompt_when_given() {
        let backend = StrengthImageToImageBackend::new("m");
        let req = request(json!({
            "prompt": "a", "mode": "img2img", "init_image": "aW1n", "negative_prompt": "blur"
        }));
        let payload = backend.build_payload(&req, "a").unwrap();
        assert_eq!(payload["negative_prompt"], "blur");
        assert_eq!(backend.config_used(&req).negative_prompt.as_deref(), Some("blur"));
    }

    #[test]
    fn strength_backend_requires_init_image() {
        let backend = StrengthImageToImageBackend::new("m");
        let req = request(json!({"prompt": "a", "mode": "img2img"}));
        assert!(matches!(
            backend.validate(&req),
            Err(GenerationError::MissingInitImage)
        ));
    }

    #[test]
    fn parse_accepts_artifacts() {
        let backend = TextToImageBackend::new("m");
        let image = backend
            .parse_result(&json!({"artifacts": [{"base64": "QUJD", "seed": 1}]}))
            .unwrap();
        assert_eq!(image, "QUJD");
    }

    #[test]
    fn parse_reports_filter_reason() {
        let backend = TextToImageBackend::new("m");
        let err = backend
            .parse_result(&json!({"images": [], "finish_reasons": ["Filter reason: prompt"]}))
            .unwrap_err();
        match err {
            GenerationError::SynthesisFailed { reason, .. } => {
                assert!(reason.contains("Filter reason: prompt"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
