pub mod dimensions;
pub mod stability;
pub mod titan;
pub mod traits;

use crate::{
    config::GenerationConfig,
    models::{Img2ImgVariant, Mode},
};

pub use stability::{StrengthImageToImageBackend, TextToImageBackend};
pub use titan::TitanVariationBackend;
pub use traits::SynthesisBackend;

/// Holds one backend per variant and picks the one a request routes to.
pub struct SynthesisRegistry {
    text_to_image: TextToImageBackend,
    strength: StrengthImageToImageBackend,
    similarity: TitanVariationBackend,
    img2img_variant: Img2ImgVariant,
}

impl SynthesisRegistry {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            text_to_image: TextToImageBackend::new(config.image_model.clone()),
            strength: StrengthImageToImageBackend::new(config.image_model.clone()),
            similarity: TitanVariationBackend::new(config.titan_model.clone()),
            img2img_variant: config.img2img_variant,
        }
    }

    pub fn select(&self, mode: Mode) -> &dyn SynthesisBackend {
        self.select_variant(mode, self.img2img_variant)
    }

    pub fn select_variant(&self, mode: Mode, variant: Img2ImgVariant) -> &dyn SynthesisBackend {
        match (mode, variant) {
            (Mode::Text2Img, _) => &self.text_to_image,
            (Mode::Img2Img, Img2ImgVariant::Strength) => &self.strength,
            (Mode::Img2Img, Img2ImgVariant::Similarity) => &self.similarity,
        }
    }
}
