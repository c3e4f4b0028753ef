use crate::{
    bedrock::BedrockRuntime,
    config::GenerationConfig,
    error::{GenerationError, Result},
    models::{ConverseRequest, ImageFormat, ReferenceImage, RewriteOutcome},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;

/// Rewrites user prompts into enhanced English prompts.
///
/// A rewrite tries `converse` first and falls back to a single raw
/// `invoke_model` call. If neither yields text the original prompt is kept;
/// a rewrite never fails the request.
#[derive(Clone)]
pub struct TextClient {
    runtime: Arc<dyn BedrockRuntime>,
    config: GenerationConfig,
}

impl TextClient {
    pub fn new(runtime: Arc<dyn BedrockRuntime>, config: GenerationConfig) -> Self {
        Self { runtime, config }
    }

    pub fn instruction(&self, prompt: &str, language: &str) -> String {
        format!(
            "\nYou are an advanced AI specialized in visual analysis and professional prompt engineering.\n\
             Reply within {} characters only.\n\n\
             Rewrite the following {} prompt into the best possible English version.\n\n\
             Original Prompt:\n{}\n",
            self.config.rewrite_char_budget,
            language.to_uppercase(),
            prompt
        )
    }

    pub async fn rewrite(
        &self,
        prompt: &str,
        language: &str,
        init_image: Option<&str>,
    ) -> RewriteOutcome {
        let request = ConverseRequest {
            model_id: self.config.prompt_enhancer_model.clone(),
            text: self.instruction(prompt, language),
            image: init_image.and_then(reference_image),
            max_tokens: self.config.rewrite_max_tokens,
            temperature: self.config.rewrite_temperature,
            top_p: self.config.rewrite_top_p,
        };

        match self.converse(&request).await {
            Ok(text) => return RewriteOutcome::Rewritten(text),
            Err(e) => log::warn!("Prompt rewrite via converse failed, trying invoke fallback: {}", e),
        }

        match self.invoke_fallback(&request).await {
            Ok(text) => RewriteOutcome::Rewritten(text),
            Err(e) => {
                log::warn!("Prompt rewrite fallback failed, keeping original prompt: {}", e);
                RewriteOutcome::Original(prompt.to_string())
            }
        }
    }

    async fn converse(&self, request: &ConverseRequest) -> Result<String> {
        let text = self.runtime.converse(request).await?;
        usable_text(Some(&text))
    }

    async fn invoke_fallback(&self, request: &ConverseRequest) -> Result<String> {
        let response = self
            .runtime
            .invoke_model(&request.model_id, &fallback_payload(request))
            .await?;

        let text = response
            .pointer("/output/message/content/0/text")
            .and_then(Value::as_str);
        usable_text(text)
    }
}

/// Decodes the caller's base64 image; an undecodable image is dropped from
/// the rewrite rather than failing it.
fn reference_image(encoded: &str) -> Option<ReferenceImage> {
    match STANDARD.decode(encoded) {
        Ok(bytes) => Some(ReferenceImage {
            format: ImageFormat::sniff(&bytes),
            bytes,
            base64: encoded.to_string(),
        }),
        Err(e) => {
            log::warn!("init_image is not valid base64, rewriting without it: {}", e);
            None
        }
    }
}

fn fallback_payload(request: &ConverseRequest) -> Value {
    let mut content = vec![json!({ "text": request.text })];
    if let Some(image) = &request.image {
        content.push(json!({
            "image": {
                "format": image.format.as_str(),
                "source": { "bytes": image.base64 }
            }
        }));
    }

    json!({
        "messages": [{ "role": "user", "content": content }],
        "inferenceConfig": { "maxTokens": request.max_tokens }
    })
}

fn usable_text(text: Option<&str>) -> Result<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .ok_or_else(|| GenerationError::ResponseError("rewrite returned no text".into()))
}
