use std::path::PathBuf;

use tokio::sync::oneshot;

/// Request sent to the inference thread
pub enum InferenceRequest {
    /// Answer a question about a stored image
    Answer {
        image_path: PathBuf,
        question: String,
        response_tx: oneshot::Sender<eyre::Result<String>>,
    },
    /// Get current model status
    GetModelStatus {
        response_tx: oneshot::Sender<ModelStatus>,
    },
}

/// Current status of the models owned by the inference thread
#[derive(Clone, serde::Serialize)]
pub struct ModelStatus {
    pub vision: Option<String>,
    pub text: Option<String>,
}
