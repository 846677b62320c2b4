use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::inference::InferenceRequest;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Channel to send requests to the inference thread
    pub inference_tx: mpsc::Sender<InferenceRequest>,
    /// Resolved startup configuration
    pub config: Arc<Config>,
}
