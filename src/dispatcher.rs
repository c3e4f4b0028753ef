use crate::{
    bedrock::BedrockClient,
    config::{BedrockConfig, GenerationConfig},
    error::Result,
    logger,
    models::{
        GatewayResponse, GenerationRequest, GenerationResult, RawGenerationRequest, RewriteOutcome,
    },
    response::ResponseBuilder,
    synthesis::SynthesisRegistry,
};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::convert::TryFrom;
use std::panic::AssertUnwindSafe;
use uuid::Uuid;

/// Turns one inbound event into one gateway response.
///
/// Holds no per-request state; a single instance serves every request.
pub struct RequestDispatcher {
    client: BedrockClient,
    registry: SynthesisRegistry,
}

impl RequestDispatcher {
    pub fn new(client: BedrockClient, config: &GenerationConfig) -> Self {
        Self {
            registry: SynthesisRegistry::new(config),
            client,
        }
    }

    /// Builds the dispatcher and its Bedrock client from the environment.
    pub async fn from_env() -> Result<Self> {
        let bedrock_config = BedrockConfig::from_env();
        let generation_config = GenerationConfig::from_env();

        log::info!("🌍 Region: {}", bedrock_config.region_or_default());
        if bedrock_config.access_key.is_none() {
            log::warn!("⚠️  No AWS credentials in environment variables, using default credential chain");
        }
        logger::log_config_info(&generation_config);

        let client = BedrockClient::new(bedrock_config, &generation_config).await?;
        Ok(Self::new(client, &generation_config))
    }

    /// Never fails: errors and panics become 4xx/5xx responses.
    pub async fn handle(&self, event: &Value) -> GatewayResponse {
        let request_id = Uuid::new_v4().to_string();

        match AssertUnwindSafe(self.dispatch(event, &request_id))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => {
                log::info!("[req:{}] Image generated", request_id);
                ResponseBuilder::success(result)
            }
            Ok(Err(e)) => {
                if e.is_validation() {
                    log::warn!("[req:{}] Rejected request: {}", request_id, e);
                } else {
                    log::error!("[req:{}] Request failed: {}", request_id, e);
                }
                ResponseBuilder::failure(&e, &request_id)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log::error!("[req:{}] Handler panicked: {}", request_id, message);
                ResponseBuilder::panicked(&message, &request_id)
            }
        }
    }

    pub async fn dispatch(&self, event: &Value, request_id: &str) -> Result<GenerationResult> {
        let raw = RawGenerationRequest::from_event(event)?;
        let request = GenerationRequest::try_from(raw)?;
        self.generate(&request, request_id).await
    }

    /// Validation runs before any remote call; then at most one rewrite chain
    /// and exactly one synthesis call.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        request_id: &str,
    ) -> Result<GenerationResult> {
        let backend = self.registry.select(request.mode);
        backend.validate(request)?;

        log::info!(
            "[req:{}] mode={} backend={} aspect_ratio={} regen_prompt={}",
            request_id,
            request.mode.as_str(),
            backend.kind().as_str(),
            request.aspect_ratio,
            request.regen_prompt
        );

        let outcome = if request.regen_prompt {
            self.client
                .text()
                .rewrite(
                    &request.prompt,
                    &request.prompt_language,
                    request.init_image(),
                )
                .await
        } else {
            RewriteOutcome::Original(request.prompt.clone())
        };

        if outcome.is_rewritten() {
            log::debug!("[req:{}] Enhanced prompt: {}", request_id, outcome.text());
        }

        let image = self
            .client
            .image()
            .generate(backend, request, outcome.text())
            .await?;

        let mut config_used = backend.config_used(request);
        config_used.model_id = image.model;
        config_used.prompt_rewritten = outcome.is_rewritten();

        Ok(GenerationResult {
            enhanced_prompt: outcome.into_text(),
            config_used,
            image_base64: image.image_data,
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
