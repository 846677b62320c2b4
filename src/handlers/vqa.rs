use std::path::{Path, PathBuf};
use std::time::Duration;

use salvo::prelude::*;

use crate::error::render_error;
use crate::images;
use crate::inference::InferenceRequest;
use crate::state::AppState;
use crate::types::{AnswerResponse, ImageUrlRequest};

use super::{get_state, send_and_wait};

/// Timeout for a full VQA pipeline run (five model calls)
const ANSWER_TIMEOUT: Duration = Duration::from_secs(300); // 5 minutes

/// POST /api/upload - Answer a question about an uploaded image
///
/// Multipart form: `image` file + `question` field.
#[handler]
pub async fn upload_image(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let question: String = req.form("question").await.unwrap_or_default();
    if question.trim().is_empty() {
        render_error(
            res,
            salvo::http::StatusCode::BAD_REQUEST,
            "question is required",
            "invalid_request_error",
        );
        return Ok(());
    }

    let Some(file) = req.file("image").await else {
        render_error(
            res,
            salvo::http::StatusCode::BAD_REQUEST,
            "image file is required",
            "invalid_request_error",
        );
        return Ok(());
    };
    let data = tokio::fs::read(file.path()).await.map_err(|e| {
        tracing::error!("Failed to read uploaded file: {}", e);
        StatusError::internal_server_error()
    })?;

    let state = get_state(depot)?;
    let dir = state.config.temp_image_dir.clone();
    let stored = tokio::task::spawn_blocking(move || store_validated(&data, &dir))
        .await
        .map_err(|_| StatusError::internal_server_error())?;

    match stored {
        Ok(image_path) => answer_stored_image(state, image_path, question, res).await,
        Err(e) => {
            render_error(
                res,
                salvo::http::StatusCode::BAD_REQUEST,
                &e.to_string(),
                "invalid_request_error",
            );
            Ok(())
        }
    }
}

/// POST /api/url - Answer a question about an image fetched from a URL
#[handler]
pub async fn answer_from_url(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let request: ImageUrlRequest = req.parse_json().await.map_err(|e| {
        tracing::error!("Failed to parse request: {}", e);
        StatusError::bad_request()
    })?;

    if request.question.trim().is_empty() {
        render_error(
            res,
            salvo::http::StatusCode::BAD_REQUEST,
            "question is required",
            "invalid_request_error",
        );
        return Ok(());
    }
    if !request.url.starts_with("http://") && !request.url.starts_with("https://") {
        render_error(
            res,
            salvo::http::StatusCode::BAD_REQUEST,
            "url must use http or https",
            "invalid_request_error",
        );
        return Ok(());
    }

    let state = get_state(depot)?;
    let dir = state.config.temp_image_dir.clone();
    let url = request.url.clone();
    let stored = tokio::task::spawn_blocking(move || fetch_validated(&url, &dir))
        .await
        .map_err(|_| StatusError::internal_server_error())?;

    match stored {
        Ok(image_path) => answer_stored_image(state, image_path, request.question, res).await,
        Err(e) => {
            render_error(
                res,
                salvo::http::StatusCode::BAD_REQUEST,
                &format!("failed to fetch image: {e}"),
                "invalid_request_error",
            );
            Ok(())
        }
    }
}

/// Save bytes into the temp store and make sure they decode as an image.
fn store_validated(data: &[u8], dir: &Path) -> eyre::Result<PathBuf> {
    let path = images::save_uploaded_image(data, dir)?;
    if !images::validate_image(&path) {
        let _ = std::fs::remove_file(&path);
        eyre::bail!("invalid image file");
    }
    Ok(path)
}

/// Fetch a URL into the temp store and make sure it decodes as an image.
fn fetch_validated(url: &str, dir: &Path) -> eyre::Result<PathBuf> {
    let path = images::download_image(url, dir)?;
    if !images::validate_image(&path) {
        let _ = std::fs::remove_file(&path);
        eyre::bail!("downloaded file is not a valid image");
    }
    Ok(path)
}

async fn answer_stored_image(
    state: &AppState,
    image_path: PathBuf,
    question: String,
    res: &mut Response,
) -> Result<(), StatusError> {
    let request_path = image_path.clone();
    let answer = send_and_wait(
        &state.inference_tx,
        |tx| InferenceRequest::Answer {
            image_path: request_path,
            question,
            response_tx: tx,
        },
        ANSWER_TIMEOUT,
    )
    .await?;

    res.render(Json(AnswerResponse {
        answer,
        image_path: image_path.to_string_lossy().into_owned(),
    }));
    Ok(())
}
