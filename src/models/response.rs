use crate::models::{BackendKind, Mode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Echo of the parameters a backend actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUsed {
    pub mode: Mode,
    pub backend: BackendKind,
    pub aspect_ratio: String,
    pub strength: f64,
    pub model_id: String,
    pub regen_prompt: bool,
    pub prompt_rewritten: bool,
    pub prompt_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titan_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titan_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub enhanced_prompt: String,
    pub config_used: ConfigUsed,
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessBody {
    pub message: String,
    pub enhanced_prompt: String,
    pub config_used: ConfigUsed,
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Lambda proxy style response; `body` holds the JSON-encoded payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}
