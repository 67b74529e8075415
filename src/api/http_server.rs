// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::recognize::recognize_handler;
use crate::config::ServerConfig;
use crate::pipeline::RecognitionPipeline;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecognitionPipeline>,
}

impl AppState {
    pub fn new(pipeline: RecognitionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state
        .pipeline
        .max_image_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/api/recognize", post(recognize_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_app(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Plate recognition API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
