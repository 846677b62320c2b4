//! Inference engine clients
//!
//! Both engines speak the OpenAI-compatible chat-completions protocol of a
//! local inference runtime. Clients are blocking and owned by the dedicated
//! inference thread; nothing here may run on the async runtime.

mod text;
mod vision;

pub use text::TextEngine;
pub use vision::VisionEngine;

use std::path::Path;
use std::time::Duration;

use eyre::{Context, Result};
use serde::Deserialize;

/// Timeout for a single backend completion call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// An image attached to a chat message, encoded as a base64 data URL.
pub struct ImagePayload {
    data_url: String,
}

impl ImagePayload {
    /// Read an image file and encode it for the backend.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data =
            std::fs::read(path).with_context(|| format!("failed to read image {:?}", path))?;
        Ok(Self::from_bytes(&data))
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mime = match image::guess_format(data) {
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::Gif) => "image/gif",
            Ok(image::ImageFormat::WebP) => "image/webp",
            _ => "image/jpeg",
        };
        let encoded =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, data);
        Self {
            data_url: format!("data:{};base64,{}", mime, encoded),
        }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

fn build_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build backend HTTP client")
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// POST a single-message chat completion and return the reply content.
fn chat_completion(
    client: &reqwest::blocking::Client,
    base_url: &str,
    model: &str,
    content: serde_json::Value,
    temperature: f32,
    top_p: Option<f32>,
    max_tokens: usize,
) -> Result<String> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let mut payload = serde_json::json!({
        "model": model,
        "messages": [{ "role": "user", "content": content }],
        "temperature": temperature,
        "max_tokens": max_tokens,
    });
    if let Some(top_p) = top_p {
        payload["top_p"] = serde_json::json!(top_p);
    }

    let response: ChatCompletionResponse = client
        .post(&url)
        .json(&payload)
        .send()
        .with_context(|| format!("backend request to {} failed", url))?
        .error_for_status()
        .context("backend returned an error status")?
        .json()
        .context("failed to decode backend response")?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("backend returned no choices"))?;
    Ok(choice.message.content.trim().to_string())
}

/// Check that the backend is reachable. Used at startup for an early warning;
/// requests are still attempted later either way.
pub fn ping_backend(base_url: &str) -> Result<()> {
    let url = format!("{}/models", base_url.trim_end_matches('/'));
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    client
        .get(&url)
        .send()
        .with_context(|| format!("backend not reachable at {}", url))?
        .error_for_status()
        .with_context(|| format!("backend at {} returned an error status", url))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_encodes_a_data_url() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(1, 1));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let payload = ImagePayload::from_bytes(&buf);
        assert!(payload.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn unknown_bytes_default_to_jpeg_mime() {
        let payload = ImagePayload::from_bytes(b"not an image");
        assert!(payload.data_url().starts_with("data:image/jpeg;base64,"));
    }
}
