//! Vision engine: captioning and direct visual question answering

use eyre::Result;

use crate::model_registry::ModelSpec;

use super::{build_client, chat_completion, ImagePayload};

/// Token budget for a generated caption
const CAPTION_MAX_TOKENS: usize = 50;
/// Token budget for a direct visual answer
const ANSWER_MAX_TOKENS: usize = 100;

const CAPTION_PROMPT: &str = "Describe this image in one short sentence.";

/// Client for the image-understanding model.
pub struct VisionEngine {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl VisionEngine {
    pub fn new(base_url: &str, spec: &ModelSpec) -> Result<Self> {
        tracing::info!("Using vision model {} ({})", spec.id, spec.repo_id);
        Ok(Self {
            client: build_client()?,
            base_url: base_url.to_string(),
            model: spec.repo_id.to_string(),
        })
    }

    /// Generate a caption for the image.
    pub fn caption(&self, image: &ImagePayload) -> Result<String> {
        self.ask(image, CAPTION_PROMPT, CAPTION_MAX_TOKENS)
    }

    /// Answer a question about the image.
    pub fn answer(&self, image: &ImagePayload, question: &str) -> Result<String> {
        self.ask(image, question, ANSWER_MAX_TOKENS)
    }

    fn ask(&self, image: &ImagePayload, prompt: &str, max_tokens: usize) -> Result<String> {
        let content = serde_json::json!([
            { "type": "text", "text": prompt },
            { "type": "image_url", "image_url": { "url": image.data_url() } },
        ]);
        // Greedy decoding for visual answers
        chat_completion(
            &self.client,
            &self.base_url,
            &self.model,
            content,
            0.0,
            None,
            max_tokens,
        )
    }
}
