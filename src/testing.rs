//! Scripted `BedrockRuntime` for unit tests.

use crate::{
    bedrock::BedrockRuntime,
    config::GenerationConfig,
    error::{GenerationError, Result},
    models::{ConverseRequest, ImageFormat},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    Converse {
        model_id: String,
        text: String,
        image_format: Option<ImageFormat>,
    },
    Invoke {
        model_id: String,
        payload: Value,
    },
}

/// Replies left as `None` fail with an AWS error. Invokes against the rewrite
/// model get the fallback reply; every other model gets the image reply.
pub struct MockRuntime {
    rewrite_model: String,
    converse_reply: Option<String>,
    fallback_reply: Option<Value>,
    image_reply: Option<Value>,
    calls: Mutex<Vec<RuntimeCall>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            rewrite_model: GenerationConfig::default().prompt_enhancer_model,
            converse_reply: None,
            fallback_reply: None,
            image_reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_converse_reply(mut self, text: &str) -> Self {
        self.converse_reply = Some(text.to_string());
        self
    }

    pub fn with_fallback_reply(mut self, response: Value) -> Self {
        self.fallback_reply = Some(response);
        self
    }

    pub fn with_image_reply(mut self, response: Value) -> Self {
        self.image_reply = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn converse_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RuntimeCall::Converse { .. }))
            .count()
    }

    pub fn invoked_models(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RuntimeCall::Invoke { model_id, .. } => Some(model_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RuntimeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BedrockRuntime for MockRuntime {
    async fn converse(&self, request: &ConverseRequest) -> Result<String> {
        self.record(RuntimeCall::Converse {
            model_id: request.model_id.clone(),
            text: request.text.clone(),
            image_format: request.image.as_ref().map(|image| image.format),
        });
        self.converse_reply
            .clone()
            .ok_or_else(|| GenerationError::AwsError("converse unavailable".into()))
    }

    async fn invoke_model(&self, model_id: &str, payload: &Value) -> Result<Value> {
        self.record(RuntimeCall::Invoke {
            model_id: model_id.to_string(),
            payload: payload.clone(),
        });
        let reply = if model_id == self.rewrite_model {
            &self.fallback_reply
        } else {
            &self.image_reply
        };
        reply
            .clone()
            .ok_or_else(|| GenerationError::AwsError(format!("{} unavailable", model_id)))
    }
}
