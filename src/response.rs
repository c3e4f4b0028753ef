use crate::{
    error::GenerationError,
    models::{ErrorBody, GatewayResponse, GenerationResult, SuccessBody},
};
use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;
use std::error::Error as StdError;

pub const SUCCESS_MESSAGE: &str = "Image generated successfully";

pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn success(result: GenerationResult) -> GatewayResponse {
        let body = SuccessBody {
            message: SUCCESS_MESSAGE.to_string(),
            enhanced_prompt: result.enhanced_prompt,
            config_used: result.config_used,
            image_base64: result.image_base64,
        };
        Self::respond(200, &body)
    }

    /// Validation failures carry only the message; every 500 also carries a
    /// diagnostic trace.
    pub fn failure(error: &GenerationError, request_id: &str) -> GatewayResponse {
        let status = error.status_code();
        let trace = if status >= 500 {
            Some(diagnostic_trace(error, request_id))
        } else {
            None
        };

        Self::respond(
            status,
            &ErrorBody {
                error: error.to_string(),
                trace,
            },
        )
    }

    pub fn panicked(message: &str, request_id: &str) -> GatewayResponse {
        let error = GenerationError::InternalError(format!("handler panicked: {}", message));
        Self::failure(&error, request_id)
    }

    fn respond<T: Serialize>(status_code: u16, body: &T) -> GatewayResponse {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            log::error!("Failed to serialize response body: {}", e);
            r#"{"error":"failed to serialize response body"}"#.to_string()
        });

        GatewayResponse {
            status_code,
            headers: default_headers(),
            body,
        }
    }
}

pub fn default_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers
}

fn diagnostic_trace(error: &GenerationError, request_id: &str) -> String {
    let mut trace = format!("request {}\n{:?}", request_id, error);

    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\ncaused by: {}", cause));
        source = cause.source();
    }

    match error.origin() {
        Some(origin) => trace.push_str(&format!("\n{}", origin)),
        None => {
            let backtrace = Backtrace::capture();
            if backtrace.status() == BacktraceStatus::Captured {
                trace.push_str(&format!("\n{}", backtrace));
            }
        }
    }

    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackendKind, ConfigUsed, Mode};

    fn sample_result() -> GenerationResult {
        GenerationResult {
            enhanced_prompt: "a cat".into(),
            config_used: ConfigUsed {
                mode: Mode::Text2Img,
                backend: BackendKind::TextToImage,
                aspect_ratio: "16:9".into(),
                strength: 0.7,
                model_id: "stability.sd3-5-large-v1:0".into(),
                regen_prompt: false,
                prompt_rewritten: false,
                prompt_language: "en".into(),
                negative_prompt: None,
                titan_width: None,
                titan_height: None,
                sigma: None,
            },
            image_base64: "aW1n".into(),
        }
    }

    #[test]
    fn success_body_shape() {
        let response = ResponseBuilder::success(sample_result());
        assert_eq!(response.status_code, 200);

        let body = response.body_json().unwrap();
        assert_eq!(body["message"], SUCCESS_MESSAGE);
        assert_eq!(body["enhanced_prompt"], "a cat");
        assert_eq!(body["config_used"]["aspect_ratio"], "16:9");
        assert_eq!(body["config_used"]["mode"], "text2img");
        assert!(body["config_used"].get("titan_width").is_none());
        assert_eq!(body["image_base64"], "aW1n");
    }

    #[test]
    fn headers_are_always_present() {
        for response in [
            ResponseBuilder::success(sample_result()),
            ResponseBuilder::failure(&GenerationError::MissingPrompt, "r1"),
            ResponseBuilder::failure(&GenerationError::AwsError("boom".into()), "r2"),
        ] {
            assert_eq!(response.headers["Content-Type"], "application/json");
            assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        }
    }

    #[test]
    fn validation_failure_has_no_trace() {
        let response = ResponseBuilder::failure(&GenerationError::MissingPrompt, "r1");
        assert_eq!(response.status_code, 400);
        let body = response.body_json().unwrap();
        assert_eq!(body["error"], "Missing prompt");
        assert!(body.get("trace").is_none());
    }

    #[test]
    fn server_failure_carries_trace() {
        let error = GenerationError::synthesis("no image");
        let response = ResponseBuilder::failure(&error, "req-42");
        assert_eq!(response.status_code, 500);
        let body = response.body_json().unwrap();
        let trace = body["trace"].as_str().unwrap();
        assert!(trace.contains("req-42"));
        assert!(trace.contains("SynthesisFailed"));
        assert!(!trace.contains("caused by"));
    }

    #[test]
    fn server_failure_trace_walks_the_cause_chain() {
        let error = GenerationError::synthesis_caused_by(GenerationError::AwsServiceError(
            "Bedrock invoke_model error: ThrottlingException - slow down".into(),
        ));
        let body = ResponseBuilder::failure(&error, "req-43").body_json().unwrap();
        let trace = body["trace"].as_str().unwrap();
        assert!(trace.contains("\ncaused by: AWS service error: Bedrock invoke_model error"));
    }

    #[test]
    fn panics_become_internal_errors() {
        let response = ResponseBuilder::panicked("index out of bounds", "r3");
        assert_eq!(response.status_code, 500);
        let body = response.body_json().unwrap();
        assert!(body["error"].as_str().unwrap().contains("index out of bounds"));
    }
}
