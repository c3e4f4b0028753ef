use crate::models::Img2ImgVariant;
use std::env;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_PROMPT_ENHANCER_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const DEFAULT_IMAGE_MODEL: &str = "stability.sd3-5-large-v1:0";
pub const DEFAULT_TITAN_MODEL: &str = "amazon.titan-image-generator-v2:0";

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
            timeout_secs: 120,
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        BedrockConfig {
            region: var("AWS_REGION").or_else(|| var("AWS_DEFAULT_REGION")),
            access_key: var("AWS_ACCESS_KEY_ID"),
            secret_key: var("AWS_SECRET_ACCESS_KEY"),
            timeout_secs: var("BEDROCK_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn region_or_default(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Model ids and tuning knobs used by the dispatcher.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub prompt_enhancer_model: String,
    pub image_model: String,
    pub titan_model: String,
    pub img2img_variant: Img2ImgVariant,
    /// Character budget quoted in the rewrite instruction.
    pub rewrite_char_budget: usize,
    pub rewrite_max_tokens: i32,
    pub rewrite_temperature: f32,
    pub rewrite_top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            prompt_enhancer_model: DEFAULT_PROMPT_ENHANCER_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            titan_model: DEFAULT_TITAN_MODEL.to_string(),
            img2img_variant: Img2ImgVariant::Similarity,
            rewrite_char_budget: 300,
            rewrite_max_tokens: 400,
            rewrite_temperature: 0.7,
            rewrite_top_p: 0.9,
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let img2img_variant = match var("IMG2IMG_VARIANT") {
            Some(value) => Img2ImgVariant::from_label(&value).unwrap_or_else(|| {
                log::warn!(
                    "Unknown IMG2IMG_VARIANT '{}', using {}",
                    value,
                    defaults.img2img_variant.as_str()
                );
                defaults.img2img_variant
            }),
            None => defaults.img2img_variant,
        };

        GenerationConfig {
            prompt_enhancer_model: var("PROMPT_ENHANCER_MODEL_ID")
                .unwrap_or(defaults.prompt_enhancer_model),
            image_model: var("IMAGE_MODEL_ID").unwrap_or(defaults.image_model),
            titan_model: var("TITAN_MODEL_ID").unwrap_or(defaults.titan_model),
            img2img_variant,
            rewrite_char_budget: var("REWRITE_CHAR_BUDGET")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rewrite_char_budget),
            rewrite_max_tokens: var("REWRITE_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rewrite_max_tokens),
            ..defaults
        }
    }

    pub fn with_img2img_variant(mut self, variant: Img2ImgVariant) -> Self {
        self.img2img_variant = variant;
        self
    }

    pub fn with_prompt_enhancer_model(mut self, model_id: impl Into<String>) -> Self {
        self.prompt_enhancer_model = model_id.into();
        self
    }

    pub fn with_image_model(mut self, model_id: impl Into<String>) -> Self {
        self.image_model = model_id.into();
        self
    }

    pub fn with_titan_model(mut self, model_id: impl Into<String>) -> Self {
        self.titan_model = model_id.into();
        self
    }

    pub fn with_rewrite_char_budget(mut self, budget: usize) -> Self {
        self.rewrite_char_budget = budget;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_deployed_models() {
        let config = GenerationConfig::default();
        assert_eq!(config.image_model, "stability.sd3-5-large-v1:0");
        assert_eq!(config.titan_model, "amazon.titan-image-generator-v2:0");
        assert_eq!(config.img2img_variant, Img2ImgVariant::Similarity);
        assert_eq!(config.rewrite_max_tokens, 400);
        assert_eq!(BedrockConfig::default().region_or_default(), "us-west-2");
    }

    #[test]
    fn generation_config_reads_overrides() {
        let config = GenerationConfig::from_vars(lookup(&[
            ("IMG2IMG_VARIANT", "strength"),
            ("IMAGE_MODEL_ID", "stability.sd3-large-v1:0"),
            ("REWRITE_CHAR_BUDGET", "120"),
        ]));
        assert_eq!(config.img2img_variant, Img2ImgVariant::Strength);
        assert_eq!(config.image_model, "stability.sd3-large-v1:0");
        assert_eq!(config.rewrite_char_budget, 120);
        assert_eq!(config.titan_model, DEFAULT_TITAN_MODEL);
    }

    #[test]
    fn unknown_variant_keeps_default() {
        let config = GenerationConfig::from_vars(lookup(&[("IMG2IMG_VARIANT", "sepia")]));
        assert_eq!(config.img2img_variant, Img2ImgVariant::Similarity);
    }

    #[test]
    fn bedrock_config_prefers_aws_region() {
        let config = BedrockConfig::from_vars(lookup(&[
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("AWS_REGION", "us-east-1"),
            ("BEDROCK_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.region_or_default(), "us-east-1");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.access_key.is_none());
    }
}
