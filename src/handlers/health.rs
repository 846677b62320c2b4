use salvo::prelude::*;
use tokio::sync::oneshot;

use crate::inference::{InferenceRequest, ModelStatus};
use crate::model_registry::{self, ModelAvailability};

use super::get_state;

/// GET /health - Health check
#[handler]
pub async fn health(res: &mut Response) {
    res.render(Json(serde_json::json!({
        "status": "healthy",
        "service": "vqa-agent"
    })));
}

/// GET /api/models - Configured models with load state and weight availability
#[handler]
pub async fn list_models(depot: &mut Depot, res: &mut Response) -> Result<(), StatusError> {
    let state = get_state(depot)?;

    let (response_tx, response_rx) = oneshot::channel();
    state
        .inference_tx
        .send(InferenceRequest::GetModelStatus { response_tx })
        .await
        .map_err(|_| StatusError::internal_server_error())?;

    let status: ModelStatus = response_rx
        .await
        .map_err(|_| StatusError::internal_server_error())?;

    let specs = [
        (
            model_registry::spec_for_image(state.config.image_model),
            status.vision.is_some(),
        ),
        (
            model_registry::spec_for_text(state.config.text_model),
            status.text.is_some(),
        ),
    ];

    let now = chrono::Utc::now().timestamp();
    let data: Vec<serde_json::Value> = specs
        .iter()
        .map(|(spec, loaded)| {
            let weights_cached = matches!(
                model_registry::check_weights(spec, &state.config.model_cache_dir),
                ModelAvailability::Ready { .. }
            );
            serde_json::json!({
                "id": spec.id,
                "name": spec.name,
                "repo_id": spec.repo_id,
                "type": spec.kind,
                "created": now,
                "loaded": loaded,
                "weights_cached": weights_cached,
            })
        })
        .collect();

    res.render(Json(serde_json::json!({
        "object": "list",
        "data": data
    })));
    Ok(())
}
