// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use plate_recognition_node::{
    api::{start_server, AppState},
    config::ServerConfig,
    pipeline::RecognitionPipeline,
    version,
    vision::{PaddleOcrEngine, TextEngine},
};
use std::{env, sync::Arc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::parse();
    tracing::info!("Starting {}", version::get_version_string());
    tracing::info!("Features: {}", version::FEATURES.join(", "));

    // The engine is built once and shared by every request
    let engine = PaddleOcrEngine::load(&config.ocr_model_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize OCR engine from {}",
                config.ocr_model_dir.display()
            )
        })?;
    let engine: Arc<dyn TextEngine> = Arc::new(engine);
    tracing::info!("OCR engine '{}' loaded", engine.name());

    let pipeline = RecognitionPipeline::new(engine).with_max_image_bytes(config.max_upload_bytes);
    start_server(&config, AppState::new(pipeline)).await
}
