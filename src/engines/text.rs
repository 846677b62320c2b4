//! Text engine: free-form generation over the extracted visual context

use eyre::Result;

use crate::model_registry::ModelSpec;

use super::{build_client, chat_completion};

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.9;
const MAX_TOKENS: usize = 512;

/// Client for the language-reasoning model.
pub struct TextEngine {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl TextEngine {
    pub fn new(base_url: &str, spec: &ModelSpec) -> Result<Self> {
        tracing::info!("Using text model {} ({})", spec.id, spec.repo_id);
        Ok(Self {
            client: build_client()?,
            base_url: base_url.to_string(),
            model: spec.repo_id.to_string(),
        })
    }

    /// Generate a response for the prompt.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        chat_completion(
            &self.client,
            &self.base_url,
            &self.model,
            serde_json::Value::String(prompt.to_string()),
            TEMPERATURE,
            Some(TOP_P),
            MAX_TOKENS,
        )
    }
}
