use crate::{
    error::{GenerationError, Result},
    models::{BackendKind, ConfigUsed, GenerationRequest},
    synthesis::{
        dimensions::titan_dimensions,
        traits::{base_config, first_image, require_init_image, to_payload, SynthesisBackend},
    },
};
use serde::Serialize;
use serde_json::Value;

pub const MIN_SIMILARITY: f64 = 0.2;
pub const MAX_SIMILARITY: f64 = 1.0;
pub const CFG_SCALE: f64 = 8.0;
pub const SEED: u32 = 42;

pub fn clamp_similarity(value: f64) -> f64 {
    value.max(MIN_SIMILARITY).min(MAX_SIMILARITY)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanVariationPayload<'a> {
    task_type: &'a str,
    image_variation_params: ImageVariationParams<'a>,
    image_generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageVariationParams<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    negative_text: &'a str,
    images: Vec<&'a str>,
    similarity_strength: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    cfg_scale: f64,
    seed: u32,
    width: u32,
    height: u32,
    number_of_images: u32,
}

/// Titan IMAGE_VARIATION with explicit pixel dimensions and a clamped
/// similarity strength.
pub struct TitanVariationBackend {
    model_id: String,
}

impl TitanVariationBackend {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

impl SynthesisBackend for TitanVariationBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::TitanImageVariation
    }

    fn model_id(&self, _request: &GenerationRequest) -> String {
        self.model_id.clone()
    }

    fn validate(&self, request: &GenerationRequest) -> Result<()> {
        require_init_image(request).map(|_| ())
    }

    fn build_payload(&self, request: &GenerationRequest, prompt: &str) -> Result<Value> {
        let (width, height) = titan_dimensions(&request.aspect_ratio);

        to_payload(&TitanVariationPayload {
            task_type: "IMAGE_VARIATION",
            image_variation_params: ImageVariationParams {
                text: prompt,
                negative_text: &request.negative_prompt,
                images: vec![require_init_image(request)?],
                similarity_strength: clamp_similarity(request.similarity_strength),
            },
            image_generation_config: ImageGenerationConfig {
                cfg_scale: CFG_SCALE,
                seed: SEED,
                width,
                height,
                number_of_images: 1,
            },
        })
    }

    fn parse_result(&self, response: &Value) -> Result<String> {
        if let Some(image) = first_image(response) {
            return Ok(image);
        }

        Err(GenerationError::synthesis(
            match response.get("error").and_then(Value::as_str) {
                Some(reason) => format!("Titan model did not return image ({})", reason),
                None => "Titan model did not return image".to_string(),
            },
        ))
    }

    fn config_used(&self, request: &GenerationRequest) -> ConfigUsed {
        let (width, height) = titan_dimensions(&request.aspect_ratio);
        let mut config = base_config(
            self.kind(),
            request,
            self.model_id.clone(),
            &request.aspect_ratio,
        );
        config.titan_width = Some(width);
        config.titan_height = Some(height);
        config.sigma = Some(clamp_similarity(request.similarity_strength));
        if !request.negative_prompt.is_empty() {
            config.negative_prompt = Some(request.negative_prompt.clone());
        }
        config
    }
}
