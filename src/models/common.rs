use serde::{Deserialize, Serialize};

/// Whether synthesis starts from text alone or from a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Text2Img,
    Img2Img,
}

impl Mode {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "text2img" => Some(Mode::Text2Img),
            "img2img" => Some(Mode::Img2Img),
            _ => None,
        }
    }

    /// Unknown labels silently behave as text-to-image.
    pub fn resolve(label: Option<&str>) -> Self {
        match label {
            None => Mode::default(),
            Some(label) => Self::from_label(label).unwrap_or_else(|| {
                log::warn!("Unknown mode '{}', treating as text2img", label);
                Mode::Text2Img
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Text2Img => "text2img",
            Mode::Img2Img => "img2img",
        }
    }
}

/// Which image-to-image backend serves `img2img` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Img2ImgVariant {
    /// Stability image-to-image driven by a scalar `strength`.
    Strength,
    /// Titan image variation driven by a clamped `similarityStrength`.
    Similarity,
}

impl Img2ImgVariant {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "strength" | "stability" => Some(Img2ImgVariant::Strength),
            "similarity" | "titan" => Some(Img2ImgVariant::Similarity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Img2ImgVariant::Strength => "strength",
            Img2ImgVariant::Similarity => "similarity",
        }
    }
}

/// The synthesis path a request was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    TextToImage,
    StrengthImageToImage,
    TitanImageVariation,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::TextToImage => "text_to_image",
            BackendKind::StrengthImageToImage => "strength_image_to_image",
            BackendKind::TitanImageVariation => "titan_image_variation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_text2img() {
        assert_eq!(Mode::resolve(None), Mode::Text2Img);
        assert_eq!(Mode::resolve(Some("img2img")), Mode::Img2Img);
    }

    #[test]
    fn unknown_mode_is_accepted_as_text2img() {
        assert_eq!(Mode::resolve(Some("invalid_mode")), Mode::Text2Img);
        assert_eq!(Mode::resolve(Some("IMG2IMG")), Mode::Text2Img);
    }

    #[test]
    fn variant_labels() {
        assert_eq!(
            Img2ImgVariant::from_label(" Titan "),
            Some(Img2ImgVariant::Similarity)
        );
        assert_eq!(
            Img2ImgVariant::from_label("strength"),
            Some(Img2ImgVariant::Strength)
        );
        assert_eq!(Img2ImgVariant::from_label("other"), None);
    }
}
