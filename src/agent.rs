//! VQA agent combining the vision and text engines
//!
//! The vision model extracts what is in the image (caption, probe answers,
//! a direct answer to the user's question); the text model reasons over that
//! context to produce the final answer.

use std::path::Path;

use eyre::Result;

use crate::config::Config;
use crate::engines::{ImagePayload, TextEngine, VisionEngine};
use crate::model_registry;

/// Probe questions asked of the vision model for every image.
const COLOR_QUESTION: &str = "What are the main colors in this image?";
const OBJECT_QUESTION: &str = "What objects can you see in this image?";
const SCENE_QUESTION: &str = "Describe the scene in this image.";

/// Visual information extracted from an image.
#[derive(Debug, Clone)]
pub struct VisualInfo {
    pub caption: String,
    pub colors: String,
    pub objects: String,
    pub scene: String,
}

pub struct VqaAgent {
    vision: VisionEngine,
    text: TextEngine,
}

impl VqaAgent {
    /// Build engines for the configured models.
    pub fn new(config: &Config) -> Result<Self> {
        let vision_spec = model_registry::spec_for_image(config.image_model);
        let text_spec = model_registry::spec_for_text(config.text_model);
        Ok(Self {
            vision: VisionEngine::new(&config.backend_url, vision_spec)?,
            text: TextEngine::new(&config.backend_url, text_spec)?,
        })
    }

    /// Extract the caption and probe answers from an image.
    pub fn process_image(&self, image: &ImagePayload) -> Result<VisualInfo> {
        let caption = self.vision.caption(image)?;
        let colors = self.vision.answer(image, COLOR_QUESTION)?;
        let objects = self.vision.answer(image, OBJECT_QUESTION)?;
        let scene = self.vision.answer(image, SCENE_QUESTION)?;

        tracing::info!("Image processed: {}", caption);
        Ok(VisualInfo {
            caption,
            colors,
            objects,
            scene,
        })
    }

    /// Answer a question about the image at `path`.
    pub fn answer_question(&self, path: &Path, question: &str) -> Result<String> {
        tracing::info!("Answering question: {}", question);

        let image = ImagePayload::from_file(path)?;
        let direct_answer = self.vision.answer(&image, question)?;
        let info = self.process_image(&image)?;

        let prompt = answer_prompt(&info, &direct_answer, question);
        self.text.generate(&prompt)
    }
}

/// Fold the visual context into the final answer prompt.
fn answer_prompt(info: &VisualInfo, direct_answer: &str, question: &str) -> String {
    format!(
        "Based on the following image information:\n\
         Caption: {}\n\
         Colors: {}\n\
         Objects: {}\n\
         Scene: {}\n\
         Direct answer from image model: {}\n\n\
         Please provide a detailed and accurate answer to this question: {}\n\n\
         Answer:",
        info.caption, info.colors, info.objects, info.scene, direct_answer, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_folds_in_every_context_field() {
        let info = VisualInfo {
            caption: "a cat on a sofa".to_string(),
            colors: "grey and beige".to_string(),
            objects: "cat, sofa, cushion".to_string(),
            scene: "a living room".to_string(),
        };
        let prompt = answer_prompt(&info, "a cat", "What animal is this?");

        assert!(prompt.contains("Caption: a cat on a sofa"));
        assert!(prompt.contains("Colors: grey and beige"));
        assert!(prompt.contains("Objects: cat, sofa, cushion"));
        assert!(prompt.contains("Scene: a living room"));
        assert!(prompt.contains("Direct answer from image model: a cat"));
        assert!(prompt.contains("What animal is this?"));
        assert!(prompt.ends_with("Answer:"));
    }
}
