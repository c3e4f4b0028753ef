use serde::{Deserialize, Serialize};

/// Result of the prompt rewrite step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten(String),
    Original(String),
}

impl RewriteOutcome {
    pub fn text(&self) -> &str {
        match self {
            RewriteOutcome::Rewritten(text) | RewriteOutcome::Original(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            RewriteOutcome::Rewritten(text) | RewriteOutcome::Original(text) => text,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, RewriteOutcome::Rewritten(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Guesses the format from magic bytes, falling back to PNG.
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes {
            [0x89, b'P', b'N', b'G', ..] => ImageFormat::Png,
            [0xFF, 0xD8, 0xFF, ..] => ImageFormat::Jpeg,
            [b'G', b'I', b'F', b'8', ..] => ImageFormat::Gif,
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => ImageFormat::Webp,
            _ => ImageFormat::Png,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

/// A reference image attached to a rewrite conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    /// The caller's original encoding, reused by the invoke fallback.
    pub base64: String,
}

/// A single-turn conversation sent to the rewrite model.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseRequest {
    pub model_id: String,
    pub text: String,
    pub image: Option<ReferenceImage>,
    pub max_tokens: i32,
    pub temperature: f32,
    pub top_p: f32,
}
