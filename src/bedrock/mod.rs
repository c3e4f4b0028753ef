pub mod image_client;
pub mod text_client;

use crate::{
    config::{BedrockConfig, GenerationConfig},
    error::{GenerationError, Result},
    models::{ConverseRequest, ImageFormat},
};
use async_trait::async_trait;
use aws_config::{timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_bedrockruntime::{
    error::{ProvideErrorMetadata, SdkError},
    primitives::Blob,
    types::{
        ContentBlock, ConversationRole, ImageBlock, ImageSource, InferenceConfiguration, Message,
    },
    Client,
};
use serde_json::Value;
use std::sync::Arc;

pub use image_client::ImageClient;
pub use text_client::TextClient;

/// The two remote operations the gateway depends on.
#[async_trait]
pub trait BedrockRuntime: Send + Sync {
    /// Sends a single-turn conversation and returns the first text block.
    async fn converse(&self, request: &ConverseRequest) -> Result<String>;

    /// Invokes a model with a JSON body and returns its JSON response.
    async fn invoke_model(&self, model_id: &str, payload: &Value) -> Result<Value>;
}

/// `BedrockRuntime` backed by the AWS SDK client.
#[derive(Clone)]
pub struct SdkRuntime {
    client: Client,
}

impl SdkRuntime {
    pub async fn connect(bedrock_config: &BedrockConfig) -> Result<Self> {
        let region = bedrock_config.region_or_default();
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(bedrock_config.timeout())
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_bedrockruntime::config::Region::new(region.clone()))
            .timeout_config(timeouts);

        if let (Some(access_key), Some(secret_key)) =
            (&bedrock_config.access_key, &bedrock_config.secret_key)
        {
            loader = loader.credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "imagegen-gateway",
            ));
        }

        let aws_config = loader.load().await;
        log::info!(
            "Bedrock runtime client ready (region {}, timeout {}s)",
            region,
            bedrock_config.timeout_secs
        );

        Ok(Self {
            client: Client::new(&aws_config),
        })
    }
}

fn sdk_image_format(format: ImageFormat) -> aws_sdk_bedrockruntime::types::ImageFormat {
    use aws_sdk_bedrockruntime::types::ImageFormat as Sdk;
    match format {
        ImageFormat::Png => Sdk::Png,
        ImageFormat::Jpeg => Sdk::Jpeg,
        ImageFormat::Gif => Sdk::Gif,
        ImageFormat::Webp => Sdk::Webp,
    }
}

fn map_sdk_error<E, R>(operation: &str, error: SdkError<E, R>) -> GenerationError
where
    E: ProvideErrorMetadata + std::fmt::Debug,
    R: std::fmt::Debug,
{
    log::error!("AWS SDK {} error details: {:?}", operation, error);

    if let Some(service_error) = error.as_service_error() {
        GenerationError::AwsServiceError(format!(
            "Bedrock {} error: {} - {}",
            operation,
            service_error.code().unwrap_or("unknown"),
            service_error.message().unwrap_or("no message")
        ))
    } else {
        GenerationError::AwsError(format!("AWS SDK {} error: {}", operation, error))
    }
}

#[async_trait]
impl BedrockRuntime for SdkRuntime {
    async fn converse(&self, request: &ConverseRequest) -> Result<String> {
        let mut message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.text.clone()));

        if let Some(image) = &request.image {
            let block = ImageBlock::builder()
                .format(sdk_image_format(image.format))
                .source(ImageSource::Bytes(Blob::new(image.bytes.clone())))
                .build()
                .map_err(|e| GenerationError::RequestError(e.to_string()))?;
            message = message.content(ContentBlock::Image(block));
        }

        let message = message
            .build()
            .map_err(|e| GenerationError::RequestError(e.to_string()))?;

        let inference = InferenceConfiguration::builder()
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .top_p(request.top_p)
            .build();

        log::debug!("Conversing with model: {}", request.model_id);

        let response = self
            .client
            .converse()
            .model_id(&request.model_id)
            .messages(message)
            .inference_config(inference)
            .send()
            .await
            .map_err(|e| map_sdk_error("converse", e))?;

        let text = response
            .output()
            .ok_or_else(|| GenerationError::ResponseError("converse returned no output".into()))?
            .as_message()
            .map_err(|_| GenerationError::ResponseError("converse output is not a message".into()))?
            .content()
            .first()
            .ok_or_else(|| GenerationError::ResponseError("converse message is empty".into()))?
            .as_text()
            .map_err(|_| GenerationError::ResponseError("converse content is not text".into()))?;

        Ok(text.clone())
    }

    async fn invoke_model(&self, model_id: &str, payload: &Value) -> Result<Value> {
        let request_json = serde_json::to_vec(payload)
            .map_err(|e| GenerationError::SerializationError(e.to_string()))?;

        log::info!("Invoking model: {}", model_id);

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json))
            .send()
            .await
            .map_err(|e| map_sdk_error("invoke_model", e))?;

        let response_bytes = response.body.into_inner();
        serde_json::from_slice(&response_bytes)
            .map_err(|e| GenerationError::ResponseError(e.to_string()))
    }
}

/// Process-wide handle: one runtime shared by the text and image clients.
#[derive(Clone)]
pub struct BedrockClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl BedrockClient {
    pub async fn new(
        bedrock_config: BedrockConfig,
        generation_config: &GenerationConfig,
    ) -> Result<Self> {
        let runtime = SdkRuntime::connect(&bedrock_config).await?;
        Ok(Self::from_runtime(Arc::new(runtime), generation_config))
    }

    pub fn from_runtime(runtime: Arc<dyn BedrockRuntime>, generation_config: &GenerationConfig) -> Self {
        Self {
            text_client: TextClient::new(runtime.clone(), generation_config.clone()),
            image_client: ImageClient::new(runtime),
        }
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
