use crate::{
    bedrock::BedrockRuntime,
    error::{GenerationError, Result},
    logger,
    models::{GenerationRequest, ImageGenerationResponse},
    synthesis::SynthesisBackend,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ImageClient {
    runtime: Arc<dyn BedrockRuntime>,
}

impl ImageClient {
    pub fn new(runtime: Arc<dyn BedrockRuntime>) -> Self {
        Self { runtime }
    }

    /// Makes exactly one synthesis call; there are no retries.
    pub async fn generate(
        &self,
        backend: &dyn SynthesisBackend,
        request: &GenerationRequest,
        prompt: &str,
    ) -> Result<ImageGenerationResponse> {
        let model_id = backend.model_id(request);
        let payload = backend.build_payload(request, prompt)?;

        log::info!(
            "Generating image with model: {} ({})",
            model_id,
            backend.kind().as_str()
        );

        let response = {
            let _timer = logger::timer(&format!("synthesis {}", model_id));
            self.runtime
                .invoke_model(&model_id, &payload)
                .await
                .map_err(GenerationError::synthesis_caused_by)?
        };

        let image_data = backend.parse_result(&response)?;

        Ok(ImageGenerationResponse {
            image_data,
            model: model_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::RawGenerationRequest,
        synthesis::{TextToImageBackend, TitanVariationBackend},
        testing::{MockRuntime, RuntimeCall},
    };
    use serde_json::json;
    use std::convert::TryFrom;

    fn request(body: serde_json::Value) -> GenerationRequest {
        let raw: RawGenerationRequest = serde_json::from_value(body).unwrap();
        GenerationRequest::try_from(raw).unwrap()
    }

    #[tokio::test]
    async fn returns_image_from_backend_response() {
        let runtime = Arc::new(MockRuntime::new().with_image_reply(json!({"images": ["aW1n"]})));
        let client = ImageClient::new(runtime.clone());
        let backend = TextToImageBackend::new("stability.sd3-5-large-v1:0");

        let response = client
            .generate(&backend, &request(json!({"prompt": "a cat"})), "a cat")
            .await
            .unwrap();

        assert_eq!(response.image_data, "aW1n");
        assert_eq!(response.model, "stability.sd3-5-large-v1:0");
        match &runtime.calls()[0] {
            RuntimeCall::Invoke { model_id, payload } => {
                assert_eq!(model_id, "stability.sd3-5-large-v1:0");
                assert_eq!(payload["prompt"], "a cat");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn remote_error_is_synthesis_failure() {
        let runtime = Arc::new(MockRuntime::new());
        let client = ImageClient::new(runtime.clone());
        let backend = TitanVariationBackend::new("amazon.titan-image-generator-v2:0");
        let req = request(json!({"prompt": "y", "mode": "img2img", "init_image": "aW1n"}));

        let err = client.generate(&backend, &req, "y").await.unwrap_err();
        match &err {
            GenerationError::SynthesisFailed { source, .. } => assert!(matches!(
                source.as_deref(),
                Some(GenerationError::AwsError(_))
            )),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(runtime.calls().len(), 1);
    }
}
