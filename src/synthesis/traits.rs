use crate::{
    error::{GenerationError, Result},
    models::{BackendKind, ConfigUsed, GenerationRequest},
};
use serde_json::Value;

/// One remote image model and the payload schema it speaks.
///
/// Implementations are pure: they shape requests and read responses, while the
/// image client owns the actual remote call.
pub trait SynthesisBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn model_id(&self, request: &GenerationRequest) -> String;

    /// Backend-specific validation, run before any remote call.
    fn validate(&self, _request: &GenerationRequest) -> Result<()> {
        Ok(())
    }

    fn build_payload(&self, request: &GenerationRequest, prompt: &str) -> Result<Value>;

    /// Returns the base64 image, or `SynthesisFailed` when the response has none.
    fn parse_result(&self, response: &Value) -> Result<String>;

    fn config_used(&self, request: &GenerationRequest) -> ConfigUsed;
}

pub(crate) fn require_init_image(request: &GenerationRequest) -> Result<&str> {
    request.init_image().ok_or(GenerationError::MissingInitImage)
}

pub(crate) fn base_config(
    kind: BackendKind,
    request: &GenerationRequest,
    model_id: String,
    aspect_ratio: &str,
) -> ConfigUsed {
    ConfigUsed {
        mode: request.mode,
        backend: kind,
        aspect_ratio: aspect_ratio.to_string(),
        strength: request.strength,
        model_id,
        regen_prompt: request.regen_prompt,
        prompt_rewritten: false,
        prompt_language: request.prompt_language.clone(),
        negative_prompt: None,
        titan_width: None,
        titan_height: None,
        sigma: None,
    }
}

/// Reads the first image under `images[0]`, then `artifacts[0].base64`.
pub(crate) fn first_image(response: &Value) -> Option<String> {
    let from_images = response
        .get("images")
        .and_then(|images| images.get(0))
        .and_then(Value::as_str);

    let from_artifacts = || {
        response
            .get("artifacts")
            .and_then(|artifacts| artifacts.get(0))
            .and_then(|artifact| artifact.get("base64"))
            .and_then(Value::as_str)
    };

    from_images
        .filter(|image| !image.is_empty())
        .or_else(|| from_artifacts().filter(|image| !image.is_empty()))
        .map(String::from)
}

pub(crate) fn to_payload<T: serde::Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| GenerationError::SerializationError(e.to_string()))
}
