// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plate recognition endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::request::read_upload;
use super::response::RecognizeResponse;
use crate::api::http_server::AppState;
use crate::pipeline::{RecognitionError, RecognitionResult};

/// POST /api/recognize - Read licence plates from an uploaded image
///
/// # Request
/// `multipart/form-data` with the image in the `file` part (any part with a
/// filename is accepted if `file` is absent).
///
/// # Response
/// Always HTTP 200. Failures are reported in the body:
/// - `{"success": true, "result": [{"bbox": [x, y, w, h], "text": "..."}]}`
/// - `{"success": false, "error": "..."}`
pub async fn recognize_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<RecognizeResponse> {
    let start = Instant::now();

    let outcome = recognize_upload(&state, multipart).await;
    match &outcome {
        Ok(result) => info!(
            "Recognition complete: {} items, {}ms",
            result.len(),
            start.elapsed().as_millis()
        ),
        Err(e) => warn!("Recognition failed: {}", e),
    }

    Json(RecognizeResponse::from(outcome))
}

async fn recognize_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<RecognitionResult, RecognitionError> {
    let mut multipart = multipart
        .map_err(|e| RecognitionError::Unexpected(format!("Invalid multipart request: {}", e)))?;

    let bytes = read_upload(&mut multipart).await?;
    debug!("Upload received: {} bytes", bytes.len());

    let pipeline = state.pipeline.clone();
    tokio::task::spawn_blocking(move || pipeline.process(&bytes))
        .await
        .map_err(|e| RecognitionError::Unexpected(format!("Recognition task failed: {}", e)))?
}
