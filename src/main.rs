//! vqa-agent: Visual Question Answering HTTP service
//!
//! Provides endpoints for:
//! - GET  /health - health check
//! - GET  /api/models - configured models and weight availability
//! - POST /api/upload - multipart image upload + question
//! - POST /api/url - image URL + question
//! - GET  /images/{name} - serve a stored temp image
//!
//! Note: the engine clients are blocking, so a dedicated inference thread
//! owns them and handlers communicate with it over channels.

use eyre::Context;
use salvo::prelude::*;
use tokio::sync::{mpsc, oneshot};

use vqa_agent::config::{Config, LogLevel};
use vqa_agent::images;
use vqa_agent::inference::{self, InferenceRequest};
use vqa_agent::model_registry;
use vqa_agent::router;
use vqa_agent::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&config);

    tracing::info!("Starting VQA agent server on {}:{}", config.host, config.port);
    tracing::debug!("Configuration: {:?}", config);
    model_registry::print_startup_report(&config);

    std::fs::create_dir_all(&config.temp_image_dir).with_context(|| {
        format!(
            "failed to create temp image directory {:?}",
            config.temp_image_dir
        )
    })?;
    images::cleanup_temp_images(&config.temp_image_dir, images::MAX_IMAGE_AGE);

    // Create the channel to the inference thread
    let (inference_tx, inference_rx) = mpsc::channel::<InferenceRequest>(32);
    let (ready_tx, ready_rx) = oneshot::channel();

    // Spawn the inference thread (owns the engine clients)
    let config_clone = config.clone();
    std::thread::spawn(move || {
        inference::inference_thread(config_clone, inference_rx, ready_tx);
    });

    ready_rx
        .await
        .context("Failed to receive ready signal from inference thread")?;
    tracing::info!("Inference thread ready");

    // Hourly sweep of expired temp images
    let temp_dir = config.temp_image_dir.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        interval.tick().await; // the first tick fires immediately
        loop {
            interval.tick().await;
            let dir = temp_dir.clone();
            let _ = tokio::task::spawn_blocking(move || {
                images::cleanup_temp_images(&dir, images::MAX_IMAGE_AGE)
            })
            .await;
        }
    });

    let state = AppState {
        inference_tx,
        config: std::sync::Arc::new(config.clone()),
    };
    let router = router::build_router(state);

    let listen_addr = format!("{}:{}", config.host, config.port);
    let acceptor = TcpListener::new(&listen_addr).bind().await;

    tracing::info!("HTTP server listening on http://{}", listen_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health");
    tracing::info!("  GET  /api/models");
    tracing::info!("  POST /api/upload");
    tracing::info!("  POST /api/url");
    tracing::info!("  GET  /images/{{name}}");

    Server::new(acceptor).serve(router).await;

    Ok(())
}

/// Initialize tracing; RUST_LOG wins, otherwise the filter derives from the
/// configured LOG_LEVEL (with DEBUG=true forcing debug verbosity).
fn init_tracing(config: &Config) {
    let level = if config.debug {
        LogLevel::Debug.filter_directive()
    } else {
        config.log_level.filter_directive()
    };
    let default_filter = format!("vqa_agent={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
