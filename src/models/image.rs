use crate::{
    error::{GenerationError, Result},
    models::Mode,
};
use serde::Deserialize;
use serde_json::Value;
use std::convert::TryFrom;

pub const DEFAULT_ASPECT_RATIO: &str = "1:1";
pub const DEFAULT_STRENGTH: f64 = 0.7;
pub const DEFAULT_PROMPT_LANGUAGE: &str = "en";

/// The request body as sent by the caller, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGenerationRequest {
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub regen_prompt: Option<bool>,
    pub mode: Option<String>,
    pub aspect_ratio: Option<String>,
    pub strength: Option<f64>,
    pub similarity_strength: Option<f64>,
    pub model_id: Option<String>,
    pub prompt_language: Option<String>,
    pub init_image: Option<String>,
}

impl RawGenerationRequest {
    /// Extracts the request from an inbound event. The event is either the
    /// request object itself or carries it under `body`, as an object or as a
    /// JSON-encoded string.
    pub fn from_event(event: &Value) -> Result<Self> {
        let body = match event.get("body") {
            Some(Value::String(text)) => serde_json::from_str::<Value>(text).map_err(|e| {
                GenerationError::RequestError(format!("body is not valid JSON: {}", e))
            })?,
            Some(Value::Null) => Value::Object(Default::default()),
            Some(body) => body.clone(),
            None => event.clone(),
        };

        serde_json::from_value(body).map_err(|e| GenerationError::SerializationError(e.to_string()))
    }
}

/// A request with every default applied and the prompt validated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub regen_prompt: bool,
    pub mode: Mode,
    pub aspect_ratio: String,
    pub strength: f64,
    /// Unclamped; backends that use it clamp on their side.
    pub similarity_strength: f64,
    pub model_id: Option<String>,
    pub prompt_language: String,
    pub init_image: Option<String>,
}

impl GenerationRequest {
    pub fn init_image(&self) -> Option<&str> {
        self.init_image.as_deref()
    }
}

impl TryFrom<RawGenerationRequest> for GenerationRequest {
    type Error = GenerationError;

    fn try_from(raw: RawGenerationRequest) -> Result<Self> {
        let prompt = raw
            .prompt
            .filter(|p| !p.is_empty())
            .ok_or(GenerationError::MissingPrompt)?;

        let strength = raw.strength.unwrap_or(DEFAULT_STRENGTH);

        Ok(GenerationRequest {
            prompt,
            negative_prompt: raw.negative_prompt.unwrap_or_default(),
            regen_prompt: raw.regen_prompt.unwrap_or(true),
            mode: Mode::resolve(raw.mode.as_deref()),
            aspect_ratio: raw
                .aspect_ratio
                .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string()),
            strength,
            similarity_strength: raw.similarity_strength.unwrap_or(strength),
            model_id: raw.model_id.filter(|m| !m.is_empty()),
            prompt_language: raw
                .prompt_language
                .unwrap_or_else(|| DEFAULT_PROMPT_LANGUAGE.to_string()),
            init_image: raw.init_image.filter(|img| !img.is_empty()),
        })
    }
}

/// A synthesized image and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationResponse {
    pub image_data: String, // Base64 encoded
    pub model: String,
}
