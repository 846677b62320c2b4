//! Dedicated inference thread
//!
//! The engine clients are blocking and must stay off the async runtime, so a
//! single thread owns them and serializes requests against the backend.

use tokio::sync::{mpsc, oneshot};

use crate::agent::VqaAgent;
use crate::config::Config;
use crate::engines;
use crate::model_registry;

use super::{InferenceRequest, ModelStatus};

pub fn inference_thread(
    config: Config,
    mut rx: mpsc::Receiver<InferenceRequest>,
    ready_tx: oneshot::Sender<()>,
) {
    if let Err(e) = engines::ping_backend(&config.backend_url) {
        tracing::warn!("Inference backend check failed: {:#}", e);
        tracing::warn!("Requests will be attempted anyway; start the backend to serve answers");
    }

    let agent = match VqaAgent::new(&config) {
        Ok(agent) => Some(agent),
        Err(e) => {
            tracing::warn!("Failed to initialize VQA agent: {:#}", e);
            None
        }
    };

    // Signal that startup is complete
    let _ = ready_tx.send(());
    tracing::info!("Inference thread ready, processing requests...");

    while let Some(request) = rx.blocking_recv() {
        match request {
            InferenceRequest::Answer {
                image_path,
                question,
                response_tx,
            } => {
                let result = match agent {
                    Some(ref agent) => agent.answer_question(&image_path, &question),
                    None => Err(eyre::eyre!("VQA models not available")),
                };
                let _ = response_tx.send(result);
            }
            InferenceRequest::GetModelStatus { response_tx } => {
                let status = match agent {
                    Some(_) => ModelStatus {
                        vision: Some(
                            model_registry::spec_for_image(config.image_model)
                                .id
                                .to_string(),
                        ),
                        text: Some(
                            model_registry::spec_for_text(config.text_model)
                                .id
                                .to_string(),
                        ),
                    },
                    None => ModelStatus {
                        vision: None,
                        text: None,
                    },
                };
                let _ = response_tx.send(status);
            }
        }
    }

    tracing::info!("Inference thread shutting down");
}
